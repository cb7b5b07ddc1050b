/*!
 * ASS/SSA to SRT conversion pipeline.
 *
 * One call converts one document and owns every intermediate structure, so
 * independent conversions can run on different threads without sharing
 * anything. The only failures reported to the caller are I/O failures on
 * the input or output file; problems with individual dialogue lines are
 * absorbed and counted in the `ConversionReport`.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::ass::{EventParser, FieldFormat, ScriptVariant, SectionReader, StyleTable, SubtitleDocument};
use crate::errors::{ConversionError, DropReason};
use crate::file_utils::{FileManager, FileType};
use crate::srt::{Assembly, Caption, CaptionAssembler, LineEnding, SrtWriter};
use crate::timing::TimeBase;

/// Per-document pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    SectionsRead,
    StylesResolved,
    EventsParsed,
    Sanitized,
    TimeNormalized,
    Assembled,
    Written,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::SectionsRead => "sections read",
            Self::StylesResolved => "styles resolved",
            Self::EventsParsed => "events parsed",
            Self::Sanitized => "sanitized",
            Self::TimeNormalized => "time normalized",
            Self::Assembled => "assembled",
            Self::Written => "written",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Output options for a conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Line terminator for the SRT file
    #[serde(default)]
    pub line_ending: LineEnding,

    /// Prefix the SRT file with a UTF-8 byte order mark
    #[serde(default)]
    pub byte_order_mark: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Lf,
            byte_order_mark: false,
        }
    }
}

/// Summary of one conversion
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub variant: ScriptVariant,
    pub time_base: TimeBase,
    pub styles: usize,
    /// Dialogue lines found in the events section
    pub source_events: usize,
    pub captions: usize,
    pub malformed_events: usize,
    pub inverted_events: usize,
    pub empty_events: usize,
    pub dangling_style_refs: usize,
    pub overlaps: usize,
    pub out_of_order: usize,
}

impl ConversionReport {
    /// Events that did not become captions
    pub fn dropped(&self) -> usize {
        self.malformed_events + self.inverted_events + self.empty_events
    }

    fn record(&mut self, assembly: &Assembly) {
        self.captions = assembly.captions.len();
        self.malformed_events = assembly.dropped_count(|r| matches!(r, DropReason::Malformed(_)));
        self.inverted_events = assembly.dropped_count(|r| *r == DropReason::InvertedTiming);
        self.empty_events = assembly.dropped_count(|r| *r == DropReason::EmptyAfterSanitize);
        self.dangling_style_refs = assembly.dangling_style_refs;
        self.overlaps = assembly.overlaps;
        self.out_of_order = assembly.out_of_order;
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} captions from {} dialogue lines ({}, {})",
            self.captions, self.source_events, self.variant, self.time_base
        )?;
        if self.dropped() > 0 {
            write!(
                f,
                ", dropped {} malformed, {} inverted, {} empty",
                self.malformed_events, self.inverted_events, self.empty_events
            )?;
        }
        Ok(())
    }
}

/// One section as seen by `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub header: String,
    pub lines: usize,
}

/// Structure of a document without writing anything
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sections: Vec<SectionSummary>,
    pub style_names: Vec<String>,
    /// Columns of the `[Events]` format in effect
    pub event_fields: Vec<String>,
    pub report: ConversionReport,
}

// Everything one pass over a document produces
struct PipelineOutput {
    document: SubtitleDocument,
    styles: StyleTable,
    event_format: FieldFormat,
    captions: Vec<Caption>,
    report: ConversionReport,
}

// @struct: Drives the conversion of one document at a time
#[derive(Debug, Clone, Default)]
pub struct SubtitleConverter {
    options: ConversionOptions,
}

impl SubtitleConverter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert `input` into an SRT file at `output`.
    ///
    /// Blocks until the output is written. An existing output file is
    /// replaced; asking before overwriting is the caller's business.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ConversionReport, ConversionError> {
        trace!("{:?}: {}", input, Stage::Start);
        let text = match FileManager::read_subtitle_text(input) {
            Ok(text) => text,
            Err(source) => {
                trace!("{:?}: {}", input, Stage::Failed);
                return Err(ConversionError::ReadInput {
                    path: input.to_path_buf(),
                    source,
                });
            }
        };

        let hint = variant_hint(input);
        let PipelineOutput { captions, mut report, .. } = self.run_pipeline(&text, hint);

        if let Err(e) = self.writer().write_to_path(&captions, output) {
            trace!("{:?}: {}", input, Stage::Failed);
            return Err(e);
        }
        trace!("{:?}: {}", input, Stage::Written);

        report.input = Some(input.to_path_buf());
        report.output = Some(output.to_path_buf());
        trace!("{:?}: {}", input, Stage::Done);
        info!("Converted {:?}: {}", input, report);

        Ok(report)
    }

    /// Convert document text in memory, returning the SRT text
    pub fn convert_str(&self, text: &str, hint: Option<ScriptVariant>) -> (String, ConversionReport) {
        let output = self.run_pipeline(text, hint);
        (self.writer().render(&output.captions), output.report)
    }

    /// Parse a document and convert it to captions without writing
    pub fn captions(&self, text: &str, hint: Option<ScriptVariant>) -> (Vec<Caption>, ConversionReport) {
        let output = self.run_pipeline(text, hint);
        (output.captions, output.report)
    }

    /// Describe the structure of a document file
    pub fn inspect(&self, input: &Path) -> Result<DocumentInfo, ConversionError> {
        let text = FileManager::read_subtitle_text(input).map_err(|source| ConversionError::ReadInput {
            path: input.to_path_buf(),
            source,
        })?;

        let PipelineOutput { document, styles, event_format, mut report, .. } =
            self.run_pipeline(&text, variant_hint(input));
        report.input = Some(input.to_path_buf());

        Ok(DocumentInfo {
            title: document.script_info("Title").map(str::to_string),
            sections: document
                .sections
                .iter()
                .map(|section| SectionSummary {
                    header: section.header.clone(),
                    lines: section.lines.len(),
                })
                .collect(),
            style_names: styles.iter().map(|style| style.name.clone()).collect(),
            event_fields: event_format.names().to_vec(),
            report,
        })
    }

    fn writer(&self) -> SrtWriter {
        SrtWriter::new()
            .with_line_ending(self.options.line_ending)
            .with_byte_order_mark(self.options.byte_order_mark)
    }

    fn run_pipeline(&self, text: &str, hint: Option<ScriptVariant>) -> PipelineOutput {
        let document: SubtitleDocument = SectionReader::read(text);
        trace!("{} ({} sections)", Stage::SectionsRead, document.sections.len());
        if document.sections.is_empty() {
            warn!("No sections found, the input does not look like an ASS/SSA document");
        }

        let variant = document.variant(hint);
        let styles = StyleTable::from_document(&document, variant);
        trace!("{} ({} styles, {})", Stage::StylesResolved, styles.len(), variant);

        let parser = EventParser::for_document(&document, variant);
        let events = parser.parse_document(&document);
        trace!("{} ({} dialogue lines)", Stage::EventsParsed, events.len());

        let mut report = ConversionReport {
            variant,
            time_base: parser.time_base(),
            styles: styles.len(),
            source_events: events.len(),
            ..ConversionReport::default()
        };

        // Sanitizing and time checks happen per event inside the assembler
        let assembly = CaptionAssembler::new(&styles, document.wrap_style()).assemble(events);
        trace!("{} / {} / {}", Stage::Sanitized, Stage::TimeNormalized, Stage::Assembled);

        report.record(&assembly);
        if report.dropped() > 0 {
            debug!("Dropped {} of {} dialogue lines", report.dropped(), report.source_events);
        }

        PipelineOutput {
            event_format: document.event_format(variant),
            document,
            styles,
            captions: assembly.captions,
            report,
        }
    }
}

fn variant_hint(path: &Path) -> Option<ScriptVariant> {
    match FileManager::file_type_from_extension(path) {
        FileType::Ssa => Some(ScriptVariant::Ssa),
        FileType::Ass => Some(ScriptVariant::Ass),
        _ => None,
    }
}
