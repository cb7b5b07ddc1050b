use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ass::{EventLine, StyleTable, TextSanitizer};
use crate::errors::{ConversionError, DropReason};
use crate::timing::Timestamp;

// @module: SRT captions: assembly, writing and reading

// @const: SRT timing line regex
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2}[,.]\d{3})").unwrap()
});

// @struct: Single SRT caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    // @field: 1-based sequence number
    pub index: usize,

    pub start: Timestamp,

    pub end: Timestamp,

    // @field: Display lines, never empty for assembled captions
    pub lines: Vec<String>,
}

impl Caption {
    pub fn new(index: usize, start: Timestamp, end: Timestamp, lines: Vec<String>) -> Self {
        Caption {
            index,
            start,
            end,
            lines,
        }
    }

    /// Caption text with lines joined by newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn duration_ms(&self) -> u64 {
        self.end.as_millis().saturating_sub(self.start.as_millis())
    }

    fn write_block<W: Write>(&self, out: &mut W, eol: &str) -> io::Result<()> {
        write!(out, "{}{}", self.index, eol)?;
        write!(out, "{} --> {}{}", self.start.to_srt(), self.end.to_srt(), eol)?;
        for line in &self.lines {
            write!(out, "{}{}", line, eol)?;
        }
        write!(out, "{}", eol)
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start.to_srt(), self.end.to_srt())?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// An event that did not make it into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEvent {
    pub line_number: usize,
    pub reason: DropReason,
}

/// Outcome of caption assembly
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub captions: Vec<Caption>,
    pub dropped: Vec<DroppedEvent>,
    /// Events or `\r` resets naming an undefined style
    pub dangling_style_refs: usize,
    /// Captions starting before the previous caption ends
    pub overlaps: usize,
    /// Captions starting before the previous caption starts
    pub out_of_order: usize,
}

impl Assembly {
    /// Number of drops for which `matches` holds
    pub fn dropped_count(&self, matches: impl Fn(&DropReason) -> bool) -> usize {
        self.dropped.iter().filter(|drop| matches(&drop.reason)).count()
    }
}

/// Turns parsed events into a numbered caption sequence.
///
/// Source order is kept as is. Captions are not sorted, merged or trimmed;
/// overlaps and out-of-order starts are only counted.
pub struct CaptionAssembler<'a> {
    styles: &'a StyleTable,
    sanitizer: TextSanitizer<'a>,
}

impl<'a> CaptionAssembler<'a> {
    pub fn new(styles: &'a StyleTable, wrap_style: u8) -> Self {
        Self {
            styles,
            sanitizer: TextSanitizer::new(styles, wrap_style),
        }
    }

    pub fn assemble(&self, events: Vec<EventLine>) -> Assembly {
        let mut assembly = Assembly::default();

        for EventLine { line_number, result } in events {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping dialogue at line {}: {}", line_number, e);
                    assembly.dropped.push(DroppedEvent {
                        line_number,
                        reason: DropReason::Malformed(e),
                    });
                    continue;
                }
            };

            if !event.style.is_empty() && !self.styles.contains(&event.style) {
                debug!("Line {} uses undefined style '{}', using '{}'",
                       line_number, event.style, self.styles.fallback().name);
                assembly.dangling_style_refs += 1;
            }

            if event.start > event.end {
                debug!("Dropping line {}: starts at {} after it ends at {}",
                       line_number, event.start, event.end);
                assembly.dropped.push(DroppedEvent {
                    line_number,
                    reason: DropReason::InvertedTiming,
                });
                continue;
            }

            let text = self.sanitizer.sanitize(&event.text);
            assembly.dangling_style_refs += text.dangling_resets;
            if text.is_empty() {
                debug!("Dropping line {}: no text after cleanup", line_number);
                assembly.dropped.push(DroppedEvent {
                    line_number,
                    reason: DropReason::EmptyAfterSanitize,
                });
                continue;
            }

            if let Some(previous) = assembly.captions.last() {
                if event.start < previous.start {
                    assembly.out_of_order += 1;
                }
                if event.start < previous.end {
                    assembly.overlaps += 1;
                }
            }

            let caption = Caption::new(assembly.captions.len() + 1, event.start, event.end, text.lines);
            trace!("Caption {} from line {}: {:?}", caption.index, line_number, caption.text());
            assembly.captions.push(caption);
        }

        if assembly.out_of_order > 0 {
            warn!("{} captions start before the caption preceding them; source order was kept",
                  assembly.out_of_order);
        }

        assembly
    }
}

/// Line terminator used in written SRT files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

// @struct: Serializes captions to SRT
#[derive(Debug, Clone, Default)]
pub struct SrtWriter {
    line_ending: LineEnding,
    byte_order_mark: bool,
}

impl SrtWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_byte_order_mark(mut self, enabled: bool) -> Self {
        self.byte_order_mark = enabled;
        self
    }

    /// Write all captions to any writer
    pub fn write<W: Write>(&self, captions: &[Caption], out: &mut W) -> io::Result<()> {
        if self.byte_order_mark {
            out.write_all("\u{feff}".as_bytes())?;
        }
        let eol = self.line_ending.as_str();
        for caption in captions {
            caption.write_block(out, eol)?;
        }
        Ok(())
    }

    /// Render the captions as a string
    pub fn render(&self, captions: &[Caption]) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write(captions, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Write captions to a file, replacing it if it exists
    pub fn write_to_path(&self, captions: &[Caption], path: &Path) -> Result<(), ConversionError> {
        let to_error = |source| ConversionError::WriteOutput {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(to_error)?;
        }

        let file = File::create(path).map_err(to_error)?;
        let mut out = BufWriter::new(file);
        self.write(captions, &mut out).map_err(to_error)?;
        out.flush().map_err(to_error)
    }
}

// @struct: Parses SRT text back into captions
pub struct SrtReader;

impl SrtReader {
    /// Parse an SRT file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Caption>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read SRT file: {}", path.display()))?;
        Ok(Self::parse_str(&content))
    }

    /// Parse SRT text.
    ///
    /// Blocks missing an index or timing line are skipped with a warning.
    /// Captions are returned in file order with their written indices.
    pub fn parse_str(content: &str) -> Vec<Caption> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut captions = Vec::new();

        let mut current_index: Option<usize> = None;
        let mut current_timing: Option<(Timestamp, Timestamp)> = None;
        let mut current_lines: Vec<String> = Vec::new();

        let mut finish = |index: Option<usize>, timing: Option<(Timestamp, Timestamp)>, lines: &mut Vec<String>| {
            match (index, timing) {
                (Some(index), Some((start, end))) if !lines.is_empty() => {
                    captions.push(Caption::new(index, start, end, std::mem::take(lines)));
                }
                (Some(index), _) => {
                    warn!("Skipping incomplete SRT block {}", index);
                    lines.clear();
                }
                _ => lines.clear(),
            }
        };

        for (line_count, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if current_index.is_some() {
                    finish(current_index.take(), current_timing.take(), &mut current_lines);
                }
                continue;
            }

            if current_index.is_none() {
                match trimmed.parse::<usize>() {
                    Ok(index) => current_index = Some(index),
                    Err(_) => warn!("Unexpected text at line {} before a caption index: {}", line_count + 1, trimmed),
                }
                continue;
            }

            if current_timing.is_none() {
                let timing = TIMING_LINE_REGEX.captures(trimmed).and_then(|caps| {
                    Some((Timestamp::parse_srt(&caps[1])?, Timestamp::parse_srt(&caps[2])?))
                });
                match timing {
                    Some(timing) => current_timing = Some(timing),
                    None => {
                        warn!("Invalid timing line at line {}: {}", line_count + 1, trimmed);
                        current_index = None;
                    }
                }
                continue;
            }

            current_lines.push(trimmed.to_string());
        }

        if current_index.is_some() {
            finish(current_index, current_timing, &mut current_lines);
        }

        captions
    }
}
