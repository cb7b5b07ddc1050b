/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use ass2srt::file_utils::{FileManager, FileType};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.ass", "[Events]")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.ass"));
}

/// Test the default output path next to the input
#[test]
fn test_generate_output_path_withoutDirOrSuffix_shouldSitNextToInput() {
    let output = FileManager::generate_output_path("/subs/Inception.ass", None, None);
    assert_eq!(output, Path::new("/subs/Inception.srt"));
}

/// Test output path with an output directory and suffix
#[test]
fn test_generate_output_path_withDirAndSuffix_shouldUseBoth() {
    let output = FileManager::generate_output_path(
        "/subs/ASS Example V4+.ass",
        Some(Path::new("/out")),
        Some("en"),
    );
    assert_eq!(output, Path::new("/out/ASS Example V4+.en.srt"));

    let blank = FileManager::generate_output_path("movie.ssa", None, Some("  "));
    assert_eq!(blank, Path::new("movie.srt"));
}

/// Test the extension-keeping output path used for clashing stems
#[test]
fn test_generate_extended_output_path_withSuffix_shouldKeepExtension() {
    let output = FileManager::generate_extended_output_path("/subs/a.ssa", None, Some("en"));
    assert_eq!(output, Path::new("/subs/a.ssa.en.srt"));
}

/// Test that folder scanning finds only scripts, recursively and sorted
#[test]
fn test_find_subtitle_files_withMixedFiles_shouldFindScripts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("season1"))?;
    common::create_test_file(root, "b.ass", "")?;
    common::create_test_file(root, "a.SSA", "")?;
    common::create_test_file(root, "notes.txt", "")?;
    common::create_test_file(root, "done.srt", "")?;
    common::create_test_file(&root.join("season1"), "e01.ass", "")?;

    let files = FileManager::find_subtitle_files(root)?;

    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.SSA", "b.ass", "season1/e01.ass"]);
    Ok(())
}

/// Test type detection by extension
#[test]
fn test_file_type_from_extension_withKnownExtensions_shouldClassify() {
    assert_eq!(FileManager::file_type_from_extension("x.ASS"), FileType::Ass);
    assert_eq!(FileManager::file_type_from_extension("x.ssa"), FileType::Ssa);
    assert_eq!(FileManager::file_type_from_extension("x.srt"), FileType::Srt);
    assert_eq!(FileManager::file_type_from_extension("x.txt"), FileType::Unknown);
}

/// Test type detection by content when the extension says nothing
#[test]
fn test_detect_file_type_withoutExtension_shouldSniffContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let ass = common::create_test_file(temp_dir.path(), "script", &common::ass_script(&[]))?;
    let ssa = common::create_test_file(temp_dir.path(), "legacy", "[Script Info]\nScriptType: v4.00\n[V4 Styles]\n")?;
    let srt = common::create_test_file(temp_dir.path(), "captions", "1\n00:00:01,000 --> 00:00:02,000\nHi\n")?;
    let other = common::create_test_file(temp_dir.path(), "notes", "hello")?;

    assert_eq!(FileManager::detect_file_type(&ass)?, FileType::Ass);
    assert_eq!(FileManager::detect_file_type(&ssa)?, FileType::Ssa);
    assert_eq!(FileManager::detect_file_type(&srt)?, FileType::Srt);
    assert_eq!(FileManager::detect_file_type(&other)?, FileType::Unknown);
    assert!(FileManager::detect_file_type(temp_dir.path().join("missing")).is_err());
    Ok(())
}

/// Test that reading strips a UTF-8 BOM
#[test]
fn test_read_subtitle_text_withBom_shouldStripIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("bom.ass");
    fs::write(&path, b"\xEF\xBB\xBF[Script Info]\n")?;

    assert_eq!(FileManager::read_subtitle_text(&path)?, "[Script Info]\n");
    Ok(())
}

/// Test that ensure_dir creates nested directories
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    Ok(())
}
