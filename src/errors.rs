/*!
 * Error types for the ass2srt crate.
 *
 * Only `ConversionError` ever reaches a caller: it covers the whole-file
 * failures (unreadable input, unwritable output). Everything that can go
 * wrong with a single dialogue line is described by `EventError` and
 * `DropReason`, which the caption assembler absorbs and counts.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a conversion
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The input file could not be opened or read
    #[error("Failed to read subtitle file {path:?}: {source}")]
    ReadInput {
        /// Path of the input document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created or written
    #[error("Failed to write SRT file {path:?}: {source}")]
    WriteOutput {
        /// Path of the output document
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a single dialogue line could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Fewer comma-separated fields than the events format declares
    #[error("expected {expected} fields, found {found}")]
    WrongFieldCount {
        expected: usize,
        found: usize,
    },

    /// The events format does not declare a required field
    #[error("events format has no '{0}' field")]
    MissingField(&'static str),

    /// A start or end field is not `H:MM:SS.ff`
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp {
        value: String,
    },
}

/// Why an event did not become a caption
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    #[error("malformed dialogue line: {0}")]
    Malformed(#[from] EventError),

    #[error("start time is after end time")]
    InvertedTiming,

    #[error("no text left after removing override tags")]
    EmptyAfterSanitize,
}
