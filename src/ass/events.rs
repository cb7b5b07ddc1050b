/*!
 * Dialogue event parsing.
 *
 * Each `Dialogue:` line is split into the fields declared by the events
 * `Format:` line. The text field is always last and may contain commas, so
 * the line is split into at most as many pieces as the format has fields.
 */

use log::{debug, warn};

use super::sections::{FieldFormat, FieldLine, ScriptVariant, SectionKind, SubtitleDocument};
use crate::errors::EventError;
use crate::timing::{TimeBase, Timestamp};

/// A dialogue line with times normalized and text left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent {
    /// 1-based line number in the source document
    pub line_number: usize,
    pub layer: i32,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Style reference, resolved later through the style table
    pub style: String,
    /// Actor / speaker name
    pub name: String,
    pub effect: String,
    /// Raw text including override blocks and `\N` markers
    pub text: String,
}

/// Result of parsing one dialogue line
pub type EventResult = Result<DialogueEvent, EventError>;

/// A parsed dialogue line tagged with its position in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLine {
    /// 1-based line number in the source document
    pub line_number: usize,
    pub result: EventResult,
}

// Event line keys that are not dialogue
const NON_DIALOGUE_KEYS: &[&str] = &["Comment", "Picture", "Sound", "Movie", "Command"];

/// Column positions resolved from an events format
#[derive(Debug, Clone)]
struct Columns {
    count: usize,
    start: usize,
    end: usize,
    text: usize,
    layer: Option<usize>,
    style: Option<usize>,
    name: Option<usize>,
    effect: Option<usize>,
}

impl Columns {
    fn resolve(format: &FieldFormat) -> Result<Self, EventError> {
        let required = |name: &'static str| format.index_of(name).ok_or(EventError::MissingField(name));
        Ok(Self {
            count: format.len(),
            start: required("Start")?,
            end: required("End")?,
            text: required("Text")?,
            layer: format.index_of("Layer"),
            style: format.index_of("Style"),
            name: format.index_of("Name").or_else(|| format.index_of("Actor")),
            effect: format.index_of("Effect"),
        })
    }
}

// @struct: Parser for the [Events] section of one document
pub struct EventParser {
    columns: Result<Columns, EventError>,
    time_base: TimeBase,
}

impl EventParser {
    /// Create a parser for a document.
    ///
    /// The time base is detected once from the first dialogue line, not per
    /// line, so a document is read with a single precision throughout.
    pub fn for_document(document: &SubtitleDocument, variant: ScriptVariant) -> Self {
        let format = document.event_format(variant);

        let columns = Columns::resolve(&format);
        if let Err(e) = &columns {
            warn!("Events format is unusable ({}), no dialogue can be read", e);
        }

        let time_base = match &columns {
            Ok(columns) => Self::dialogue_lines(document)
                .find_map(|line| split_fields(&line.value, columns.count).get(columns.start).map(|s| TimeBase::detect(s)))
                .unwrap_or_default(),
            Err(_) => TimeBase::default(),
        };
        debug!("Dialogue timestamps use {}", time_base);

        Self { columns, time_base }
    }

    /// Create a parser from an explicit format and time base
    pub fn new(format: &FieldFormat, time_base: TimeBase) -> Self {
        Self {
            columns: Columns::resolve(format),
            time_base,
        }
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    /// Parse every dialogue line of the document in source order
    pub fn parse_document(&self, document: &SubtitleDocument) -> Vec<EventLine> {
        Self::dialogue_lines(document)
            .map(|line| EventLine {
                line_number: line.line_number,
                result: self.parse_line(line),
            })
            .collect()
    }

    /// Parse the value of a single `Dialogue:` line
    pub fn parse_line(&self, line: &FieldLine) -> EventResult {
        let columns = self.columns.as_ref().map_err(Clone::clone)?;
        let fields = split_fields(&line.value, columns.count);

        if fields.len() < columns.count {
            return Err(EventError::WrongFieldCount {
                expected: columns.count,
                found: fields.len(),
            });
        }

        let optional = |index: Option<usize>| index.and_then(|i| fields.get(i)).map_or(String::new(), |s| s.trim().to_string());

        Ok(DialogueEvent {
            line_number: line.line_number,
            layer: columns
                .layer
                .and_then(|i| fields[i].trim().parse().ok())
                .unwrap_or(0),
            start: Timestamp::parse(fields[columns.start], self.time_base)?,
            end: Timestamp::parse(fields[columns.end], self.time_base)?,
            style: optional(columns.style),
            name: optional(columns.name),
            effect: optional(columns.effect),
            text: fields[columns.text].to_string(),
        })
    }

    fn dialogue_lines(document: &SubtitleDocument) -> impl Iterator<Item = &FieldLine> {
        document.lines(SectionKind::Events).filter(|line| {
            if line.key.eq_ignore_ascii_case("Dialogue") {
                return true;
            }
            if !line.key.eq_ignore_ascii_case("Format")
                && !NON_DIALOGUE_KEYS.iter().any(|key| line.key.eq_ignore_ascii_case(key))
            {
                debug!("Ignoring unknown event line '{}' at line {}", line.key, line.line_number);
            }
            false
        })
    }
}

// The last field swallows any remaining commas
fn split_fields(value: &str, count: usize) -> Vec<&str> {
    value.splitn(count.max(1), ',').collect()
}
