/*!
 * Tests for the controller: single files, folders and overwrite policy
 */

use anyhow::Result;
use ass2srt::app_config::Config;
use ass2srt::app_controller::Controller;
use std::fs;
use crate::common;

const LINE: &str = "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello";

/// Test a single-file run with the default output path
#[tokio::test]
async fn test_run_withSingleFile_shouldWriteNextToInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_script(temp_dir.path(), "episode.ass", &[LINE])?;
    let controller = Controller::with_config(Config::default())?;

    let report = controller.run(input, None, false).await?;

    assert_eq!(report.map(|r| r.captions), Some(1));
    assert!(temp_dir.path().join("episode.srt").exists());
    Ok(())
}

/// Test that an existing output is left alone unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_script(temp_dir.path(), "episode.ass", &[LINE])?;
    let output = common::create_test_file(temp_dir.path(), "episode.srt", "keep me")?;
    let controller = Controller::with_config(Config::default())?;

    let skipped = controller.run(input.clone(), None, false).await?;
    assert!(skipped.is_none());
    assert_eq!(fs::read_to_string(&output)?, "keep me");

    let forced = controller.run(input, None, true).await?;
    assert!(forced.is_some());
    assert!(fs::read_to_string(&output)?.contains("Hello"));
    Ok(())
}

/// Test an explicit output path
#[tokio::test]
async fn test_run_withExplicitOutput_shouldUseIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_script(temp_dir.path(), "episode.ass", &[LINE])?;
    let output = temp_dir.path().join("out").join("custom.srt");
    let controller = Controller::with_config(Config::default())?;

    controller.run(input, Some(output.clone()), false).await?;

    assert!(output.exists());
    assert!(!temp_dir.path().join("episode.srt").exists());
    Ok(())
}

/// Test that a missing input fails the run
#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    let result = controller.run(temp_dir.path().join("missing.ass"), None, false).await;

    assert!(result.is_err());
    Ok(())
}

/// Test folder conversion into a new output directory with a suffix
#[tokio::test]
async fn test_run_folder_withScripts_shouldConvertAll() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    fs::create_dir_all(input_dir.path().join("nested"))?;
    common::create_test_script(input_dir.path(), "a.ass", &[LINE])?;
    common::create_test_script(input_dir.path(), "b.ass", &[LINE, LINE])?;
    common::create_test_script(&input_dir.path().join("nested"), "c.ssa", &[LINE])?;
    common::create_test_file(input_dir.path(), "readme.txt", "not a script")?;

    let mut config = Config::default();
    let srt_dir = output_dir.path().join("srt");
    config.output.directory = Some(srt_dir.clone());
    config.output.suffix = Some("en".to_string());
    config.concurrent_files = 2;
    let controller = Controller::with_config(config)?;

    let summary = controller.run_folder(input_dir.path().to_path_buf(), false).await?;

    assert_eq!(summary.converted, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.captions, 4);
    assert!(srt_dir.join("a.en.srt").exists());
    assert!(srt_dir.join("b.en.srt").exists());
    assert!(srt_dir.join("c.en.srt").exists());
    Ok(())
}

/// Test that a folder run skips converted files unless forced
#[tokio::test]
async fn test_run_folder_withExistingOutputs_shouldSkip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_script(temp_dir.path(), "a.ass", &[LINE])?;
    common::create_test_script(temp_dir.path(), "b.ass", &[LINE])?;
    common::create_test_file(temp_dir.path(), "a.srt", "old")?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!((summary.converted, summary.skipped), (1, 1));
    assert_eq!(fs::read_to_string(temp_dir.path().join("a.srt"))?, "old");

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), true).await?;
    assert_eq!((summary.converted, summary.skipped), (2, 0));
    Ok(())
}

/// Test that scripts sharing a stem get separate outputs
#[tokio::test]
async fn test_run_folder_withSameStemScripts_shouldKeepBothOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_script(temp_dir.path(), "a.ass",
        &["Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,from ass"])?;
    common::create_test_script(temp_dir.path(), "a.ssa",
        &["Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,from ssa"])?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;

    assert_eq!((summary.converted, summary.failed), (2, 0));
    assert!(fs::read_to_string(temp_dir.path().join("a.srt"))?.contains("from ass"));
    assert!(fs::read_to_string(temp_dir.path().join("a.ssa.srt"))?.contains("from ssa"));
    Ok(())
}

/// Test that same-named scripts in subfolders cannot share one output file
#[tokio::test]
async fn test_run_folder_withSameNameInSubfolders_shouldFailTheLaterOne() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    fs::create_dir_all(input_dir.path().join("s1"))?;
    fs::create_dir_all(input_dir.path().join("s2"))?;
    common::create_test_script(&input_dir.path().join("s1"), "ep.ass",
        &["Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,first"])?;
    common::create_test_script(&input_dir.path().join("s2"), "ep.ass",
        &["Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,second"])?;

    let mut config = Config::default();
    config.output.directory = Some(output_dir.path().to_path_buf());
    let controller = Controller::with_config(config)?;

    let summary = controller.run_folder(input_dir.path().to_path_buf(), false).await?;

    assert_eq!((summary.converted, summary.failed), (1, 1));
    assert!(fs::read_to_string(output_dir.path().join("ep.srt"))?.contains("first"));
    Ok(())
}

/// Test that a folder without scripts is an error
#[tokio::test]
async fn test_run_folder_withoutScripts_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.txt", "nothing here")?;
    let controller = Controller::with_config(Config::default())?;

    assert!(controller.run_folder(temp_dir.path().to_path_buf(), false).await.is_err());
    Ok(())
}

/// Test that a missing folder is an error
#[test]
fn test_run_folder_withMissingDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    let result = tokio_test::block_on(async {
        controller.run_folder(temp_dir.path().join("nope"), false).await
    });

    assert!(result.is_err());
    Ok(())
}

/// Test that an invalid configuration is rejected up front
#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.concurrent_files = 0;

    assert!(Controller::with_config(config).is_err());
}
