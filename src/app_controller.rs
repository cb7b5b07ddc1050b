use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::converter::{ConversionReport, SubtitleConverter};
use crate::file_utils::FileManager;

// @module: Application controller for single-file and folder conversion

/// What happened to one file of a batch
#[derive(Debug)]
pub enum FileOutcome {
    Converted(ConversionReport),
    // @variant: Output already existed and overwriting was not forced
    Skipped(PathBuf),
    Failed { input: PathBuf, error: String },
}

/// Totals for a folder run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Captions written across all converted files
    pub captions: usize,
    /// Dialogue lines dropped across all converted files
    pub dropped_events: usize,
    pub reports: Vec<ConversionReport>,
}

impl BatchSummary {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Converted(report) => {
                self.converted += 1;
                self.captions += report.captions;
                self.dropped_events += report.dropped();
                self.reports.push(report);
            }
            FileOutcome::Skipped(_) => self.skipped += 1,
            FileOutcome::Failed { input, error } => {
                error!("Error converting {:?}: {}", input, error);
                self.failed += 1;
            }
        }
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    converter: SubtitleConverter,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let converter = SubtitleConverter::new(config.conversion.clone());

        Ok(Self { config, converter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output path for an input according to the output settings
    pub fn output_path_for(&self, input_file: &Path) -> PathBuf {
        FileManager::generate_output_path(
            input_file,
            self.config.output.directory.as_deref(),
            self.config.output.suffix.as_deref(),
        )
    }

    /// Convert one file.
    ///
    /// Returns `None` when the output already exists and `force_overwrite`
    /// is not set.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<ConversionReport>> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_file = output_file.unwrap_or_else(|| self.output_path_for(&input_file));
        if output_file.exists() && !force_overwrite {
            warn!("Skipping {:?}, {:?} already exists (use -f to force overwrite)", input_file, output_file);
            return Ok(None);
        }

        let report = convert_blocking(self.converter.clone(), input_file, output_file.clone()).await?;
        info!("Success: {} ({})", output_file.display(), format_duration(start_time.elapsed()));

        Ok(Some(report))
    }

    /// Convert every ASS/SSA file below a directory.
    ///
    /// Files are converted concurrently on blocking worker threads. A file
    /// that fails is logged and counted; the rest of the batch carries on.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_subtitle_files(&input_dir)?;
        if files.is_empty() {
            return Err(anyhow!("No ASS/SSA files found in directory: {:?}", input_dir));
        }
        info!("Found {} subtitle scripts in {:?}", files.len(), input_dir);

        if let Some(directory) = &self.config.output.directory {
            FileManager::ensure_dir(directory)?;
        }

        let folder_pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));
        folder_pb.set_message("Converting files");

        let outcomes: Vec<FileOutcome> = stream::iter(self.plan_outputs(files))
            .map(|(input, output)| {
                let converter = self.converter.clone();
                let progress = folder_pb.clone();
                async move {
                    let outcome = match output {
                        Err(error) => FileOutcome::Failed { input, error },
                        Ok(output) if output.exists() && !force_overwrite => {
                            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", input);
                            FileOutcome::Skipped(input)
                        }
                        Ok(output) => match convert_blocking(converter, input.clone(), output).await {
                            Ok(report) => FileOutcome::Converted(report),
                            Err(e) => FileOutcome::Failed { input, error: format!("{:#}", e) },
                        },
                    };
                    progress.inc(1);
                    outcome
                }
            })
            .buffer_unordered(self.config.concurrent_files.max(1))
            .collect()
            .await;

        folder_pb.finish_with_message("Folder conversion complete");

        let mut summary = BatchSummary::default();
        for outcome in outcomes {
            summary.record(outcome);
        }
        // Completion order is arbitrary
        summary.reports.sort_by(|a, b| a.input.cmp(&b.input));

        info!("Folder conversion completed in {}: {} converted, {} skipped, {} errors",
              format_duration(start_time.elapsed()), summary.converted, summary.skipped, summary.failed);

        Ok(summary)
    }

    /// Pick one output per input so that no two inputs write the same file.
    ///
    /// `files` is sorted, so the first script keeps `<stem>.srt`. A later
    /// script with the same target keeps its extension (`a.ssa.srt`); if that
    /// is taken too, the script is reported as failed.
    fn plan_outputs(&self, files: Vec<PathBuf>) -> Vec<(PathBuf, Result<PathBuf, String>)> {
        let directory = self.config.output.directory.as_deref();
        let suffix = self.config.output.suffix.as_deref();
        let mut claimed = HashSet::new();

        files
            .into_iter()
            .map(|input| {
                let primary = self.output_path_for(&input);
                let output = if claimed.insert(primary.clone()) {
                    Ok(primary)
                } else {
                    let extended = FileManager::generate_extended_output_path(&input, directory, suffix);
                    if claimed.insert(extended.clone()) {
                        warn!("{:?} would also write {:?}, using {:?} instead", input, primary, extended);
                        Ok(extended)
                    } else {
                        Err(format!("Output {:?} is already used by another script", extended))
                    }
                };
                (input, output)
            })
            .collect()
    }
}

// Conversion is synchronous file I/O, so it runs off the async workers
async fn convert_blocking(converter: SubtitleConverter, input: PathBuf, output: PathBuf) -> Result<ConversionReport> {
    let report = tokio::task::spawn_blocking(move || converter.convert(&input, &output))
        .await
        .context("Conversion task panicked")??;
    Ok(report)
}

// Format duration in a human-readable format
fn format_duration(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}
