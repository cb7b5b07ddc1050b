use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ass::{ScriptVariant, SectionReader};

// @module: File and directory utilities

// @const: Section headers and event lines that only appear in ASS/SSA scripts
static SCRIPT_CONTENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^\s*(\[script info\]|\[v4\+{0,2} styles\]|\[events\]|dialogue:)").unwrap()
});

// @const: SRT block start: index line followed by a timing line
static SRT_CONTENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*\r?\n\d{2}:\d{2}:\d{2},\d{3}\s+-->\s+\d{2}:\d{2}:\d{2},\d{3}").unwrap()
});

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

// Extensions picked up when converting a folder
const SCRIPT_EXTENSIONS: &[&str] = &["ass", "ssa"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: SRT path for a script
    // @params: input_file, output_dir (defaults to the input's directory), optional suffix
    pub fn generate_output_path<P: AsRef<Path>>(
        input_file: P,
        output_dir: Option<&Path>,
        suffix: Option<&str>,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default();
        Self::srt_path_from_name(input_file, &stem.to_string_lossy(), output_dir, suffix)
    }

    // @generates: SRT path that keeps the script extension, `a.ssa` becomes `a.ssa.srt`
    // @params: same as generate_output_path
    pub fn generate_extended_output_path<P: AsRef<Path>>(
        input_file: P,
        output_dir: Option<&Path>,
        suffix: Option<&str>,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let name = input_file.file_name().unwrap_or_default();
        Self::srt_path_from_name(input_file, &name.to_string_lossy(), output_dir, suffix)
    }

    fn srt_path_from_name(input_file: &Path, name: &str, output_dir: Option<&Path>, suffix: Option<&str>) -> PathBuf {
        let mut output_filename = name.to_string();
        if let Some(suffix) = suffix.map(str::trim).filter(|s| !s.is_empty()) {
            output_filename.push('.');
            output_filename.push_str(suffix);
        }
        output_filename.push_str(".srt");

        let dir = output_dir.unwrap_or_else(|| input_file.parent().unwrap_or_else(|| Path::new("")));
        dir.join(output_filename)
    }

    /// Find ASS/SSA scripts below a directory, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_script_extension(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    fn has_script_extension(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| SCRIPT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
    }

    /// Read a subtitle file into text.
    ///
    /// Only I/O failures are errors; undecodable bytes are replaced.
    pub fn read_subtitle_text<P: AsRef<Path>>(path: P) -> io::Result<String> {
        let bytes = fs::read(path.as_ref())?;
        Ok(Self::decode_subtitle_bytes(&bytes))
    }

    /// Decode UTF-8 (with or without BOM) or BOM-marked UTF-16 text
    pub fn decode_subtitle_bytes(bytes: &[u8]) -> String {
        if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
            return decode_utf16(rest, u16::from_le_bytes);
        }
        if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
            return decode_utf16(rest, u16::from_be_bytes);
        }

        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(e) => {
                warn!("Input is not valid UTF-8 (first bad byte at offset {}), replacing invalid sequences",
                      e.valid_up_to());
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }

    /// Classify a path by extension only
    pub fn file_type_from_extension<P: AsRef<Path>>(path: P) -> FileType {
        let ext = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "ass" => FileType::Ass,
            "ssa" => FileType::Ssa,
            "srt" => FileType::Srt,
            _ => FileType::Unknown,
        }
    }

    /// Detect the subtitle format of a file, by extension first and content second
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let by_extension = Self::file_type_from_extension(path);
        if by_extension != FileType::Unknown {
            return Ok(by_extension);
        }

        let content = Self::read_subtitle_text(path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        if SCRIPT_CONTENT_REGEX.is_match(&content) {
            return Ok(match SectionReader::read(&content).variant(None) {
                ScriptVariant::Ssa => FileType::Ssa,
                ScriptVariant::Ass => FileType::Ass,
            });
        }

        if SRT_CONTENT_REGEX.is_match(&content) {
            return Ok(FileType::Srt);
        }

        Ok(FileType::Unknown)
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    if bytes.len() % 2 != 0 {
        warn!("UTF-16 input has an odd number of bytes, ignoring the last one");
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Subtitle formats recognized on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Advanced SubStation Alpha script
    Ass,
    /// SubStation Alpha v4 script
    Ssa,
    /// SubRip captions
    Srt,
    /// Unknown file type
    Unknown,
}
