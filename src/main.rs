// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use ass2srt::app_config::{self, Config};
use ass2srt::app_controller::Controller;
use ass2srt::converter::SubtitleConverter;
use ass2srt::srt::LineEnding;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert ASS/SSA scripts to SRT (default command)
    Convert(ConvertArgs),

    /// Show the structure of a script without converting it
    Inspect {
        /// ASS or SSA file to inspect
        #[arg(value_name = "INPUT")]
        input_path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions for ass2srt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct ConvertArgs {
    /// Input ASS/SSA file or directory to process
    #[arg(value_name = "INPUT")]
    input_path: PathBuf,

    /// Output SRT file (single-file mode only)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Write CRLF line endings
    #[arg(long)]
    crlf: bool,

    /// Print the conversion report as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// ass2srt - ASS/SSA to SRT subtitle converter
#[derive(Parser, Debug)]
#[command(name = "ass2srt")]
#[command(version)]
#[command(about = "Convert ASS/SSA subtitle scripts to SRT")]
#[command(long_about = "ass2srt converts Advanced SubStation Alpha and SubStation Alpha scripts into SubRip captions.

EXAMPLES:
    ass2srt movie.ass                       # Writes movie.srt next to the input
    ass2srt movie.ass -o out/movie.srt      # Explicit output path
    ass2srt -f movie.ass                    # Force overwrite existing files
    ass2srt --crlf /subs/                   # Convert a whole directory with CRLF endings
    ass2srt inspect movie.ass               # Show styles, sections and event counts
    ass2srt completions bash > ass2srt.bash # Generate bash completions

CONFIGURATION:
    Settings are read from conf.json by default. You can specify a different
    config file with --config-path. Command line flags override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input ASS/SSA file or directory to process
    #[arg(value_name = "INPUT")]
    input_path: Option<PathBuf>,

    /// Output SRT file (single-file mode only)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Write CRLF line endings
    #[arg(long)]
    crlf: bool,

    /// Print the conversion report as JSON on stdout
    #[arg(long)]
    json: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger lets everything through; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_colour_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_colour_for_level(level), now, Self::get_emoji_for_level(level), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the configured level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ass2srt", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Inspect { input_path, json }) => run_inspect(&input_path, json),
        Some(Commands::Convert(args)) => run_convert(args).await,
        None => {
            // A bare INPUT behaves like `convert INPUT`
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT is required when no subcommand is specified")
            })?;

            let convert_args = ConvertArgs {
                input_path,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                config_path: cli.config_path,
                log_level: cli.log_level,
                crlf: cli.crlf,
                json: cli.json,
            };
            run_convert(convert_args).await
        }
    }
}

fn load_config(options: &ConvertArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        info!("No config file at '{}', using defaults", options.config_path);
        Config::default()
    };

    // Override config with CLI options if provided
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.crlf {
        config.conversion.line_ending = LineEnding::Crlf;
    }

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    Ok(config)
}

async fn run_convert(options: ConvertArgs) -> Result<()> {
    let config = load_config(&options)?;
    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let report = controller
            .run(options.input_path.clone(), options.output.clone(), options.force_overwrite)
            .await?;

        if options.json {
            if let Some(report) = report {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    } else if options.input_path.is_dir() {
        if options.output.is_some() {
            warn!("--output is ignored in folder mode, set output.directory in the config instead");
        }

        let summary = controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;

        if options.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        if summary.failed > 0 {
            return Err(anyhow!("{} of {} files failed to convert",
                               summary.failed, summary.converted + summary.skipped + summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

fn run_inspect(input_path: &Path, json: bool) -> Result<()> {
    let info = SubtitleConverter::default().inspect(input_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let report = &info.report;
    println!("File:       {}", input_path.display());
    if let Some(title) = &info.title {
        println!("Title:      {}", title);
    }
    println!("Variant:    {}", report.variant);
    println!("Time base:  {}", report.time_base);
    println!("Sections:");
    for section in &info.sections {
        println!("  [{}] {} lines", section.header, section.lines);
    }
    println!("Styles:     {}", info.style_names.join(", "));
    println!("Columns:    {}", info.event_fields.join(", "));
    println!("Dialogue:   {} lines, {} captions", report.source_events, report.captions);
    println!("Dropped:    {} malformed, {} inverted, {} empty",
             report.malformed_events, report.inverted_events, report.empty_events);
    if report.dangling_style_refs > 0 {
        println!("Undefined style references: {}", report.dangling_style_refs);
    }
    if report.overlaps > 0 || report.out_of_order > 0 {
        println!("Overlapping captions: {}, out of order: {}", report.overlaps, report.out_of_order);
    }

    Ok(())
}
