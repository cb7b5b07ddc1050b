/*!
 * Tests for error types
 */

use std::error::Error;
use std::io;
use std::path::PathBuf;
use ass2srt::{ConversionError, DropReason, EventError};

/// Test that conversion errors name the file and keep the I/O source
#[test]
fn test_conversion_error_withIoSource_shouldExposeSource() {
    let err = ConversionError::ReadInput {
        path: PathBuf::from("movie.ass"),
        source: io::Error::new(io::ErrorKind::NotFound, "gone"),
    };

    assert!(err.to_string().contains("movie.ass"));
    assert!(err.source().is_some());
}

/// Test that event errors convert into drop reasons
#[test]
fn test_drop_reason_fromEventError_shouldBeMalformed() {
    let reason: DropReason = EventError::WrongFieldCount { expected: 10, found: 3 }.into();

    assert_eq!(reason, DropReason::Malformed(EventError::WrongFieldCount { expected: 10, found: 3 }));
    assert_eq!(reason.to_string(), "malformed dialogue line: expected 10 fields, found 3");
}

/// Test that conversion errors work with anyhow
#[test]
fn test_conversion_error_intoAnyhow_shouldKeepMessage() {
    let err: anyhow::Error = ConversionError::WriteOutput {
        path: PathBuf::from("out.srt"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    }
    .into();

    assert!(err.to_string().starts_with("Failed to write SRT file"));
}
