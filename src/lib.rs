/*!
 * # ass2srt - ASS/SSA to SRT subtitle converter
 *
 * A Rust library for turning Advanced SubStation Alpha (ASS) and
 * SubStation Alpha (SSA) scripts into plain SubRip (SRT) captions.
 *
 * ## Features
 *
 * - Reads ASS v4.00+ and SSA v4.00 scripts, including bilingual releases
 * - Honors the `Format:` lines of style and event sections
 * - Accepts centisecond and millisecond timestamps
 * - Strips override tags and drawing commands, keeps forced line breaks
 * - Skips broken dialogue lines instead of failing the whole file
 * - Converts single files or whole folders concurrently
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `ass`: reading of the ASS/SSA script:
 *   - `ass::sections`: section and field-line grammar
 *   - `ass::styles`: style records and the style table
 *   - `ass::events`: dialogue event parsing
 *   - `ass::sanitizer`: override tag removal and line splitting
 * - `timing`: timestamps and time base detection
 * - `srt`: caption assembly, SRT writing and reading
 * - `converter`: the per-document conversion pipeline
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations and input decoding
 * - `app_controller`: single-file and folder workflows
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod ass;
pub mod converter;
pub mod errors;
pub mod file_utils;
pub mod srt;
pub mod timing;

use std::path::Path;

// Re-export main types for easier usage
pub use app_config::Config;
pub use converter::{ConversionOptions, ConversionReport, SubtitleConverter};
pub use errors::{ConversionError, DropReason, EventError};
pub use srt::{Caption, LineEnding, SrtReader, SrtWriter};
pub use timing::{TimeBase, Timestamp};

/// Convert an ASS/SSA file to an SRT file with default options
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ConversionReport, ConversionError> {
    SubtitleConverter::default().convert(input.as_ref(), output.as_ref())
}
