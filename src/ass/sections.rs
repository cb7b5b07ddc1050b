/*!
 * Section reader for ASS/SSA documents.
 *
 * A document is a sequence of `[Header]` blocks, each holding `Key: value`
 * lines. This module only classifies lines; interpretation of styles and
 * events happens in the sibling modules using the `FieldFormat` declared by
 * each section's `Format:` line.
 */

use log::{debug, warn};
use serde::Serialize;

// @enum: Recognized section headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    ScriptInfo,
    /// `[V4 Styles]` (SSA)
    V4Styles,
    /// `[V4+ Styles]` and `[V4++ Styles]` (ASS)
    V4PlusStyles,
    Events,
    Fonts,
    Graphics,
    /// Editor state written by Aegisub, read but never interpreted
    AegisubGarbage,
    /// Any other header, kept for traceability and never interpreted
    Unknown(String),
}

impl SectionKind {
    /// Classify a header name (the text between the brackets)
    pub fn from_header(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "script info" => Self::ScriptInfo,
            "v4 styles" => Self::V4Styles,
            "v4+ styles" | "v4++ styles" => Self::V4PlusStyles,
            "events" => Self::Events,
            "fonts" => Self::Fonts,
            "graphics" => Self::Graphics,
            "aegisub project garbage" => Self::AegisubGarbage,
            _ => Self::Unknown(name.trim().to_string()),
        }
    }

    pub fn is_styles(&self) -> bool {
        matches!(self, Self::V4Styles | Self::V4PlusStyles)
    }

    /// Embedded binary payload sections whose lines are uuencoded data
    fn is_binary(&self) -> bool {
        matches!(self, Self::Fonts | Self::Graphics)
    }
}

/// One classified line inside a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    /// Text before the first ':' (empty for raw payload lines)
    pub key: String,
    /// Text after the first ':' with leading whitespace removed
    pub value: String,
    /// 1-based line number in the source document
    pub line_number: usize,
}

/// A section with its lines in document order
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    /// Header text as written, without brackets
    pub header: String,
    pub lines: Vec<FieldLine>,
}

impl Section {
    /// Lines whose key matches `key` case-insensitively
    pub fn fields<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FieldLine> + 'a {
        self.lines.iter().filter(move |line| line.key.eq_ignore_ascii_case(key))
    }

    /// The section's `Format:` line, if present
    pub fn format(&self) -> Option<FieldFormat> {
        self.fields("Format").next().map(|line| FieldFormat::parse(&line.value))
    }
}

/// Source format flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptVariant {
    /// Advanced SubStation Alpha (`ScriptType: v4.00+`)
    #[default]
    Ass,
    /// SubStation Alpha (`ScriptType: v4.00`)
    Ssa,
}

impl std::fmt::Display for ScriptVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ass => write!(f, "ASS v4.00+"),
            Self::Ssa => write!(f, "SSA v4.00"),
        }
    }
}

/// Ordered field names declared by a `Format:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFormat {
    fields: Vec<String>,
}

impl FieldFormat {
    const ASS_STYLES: &'static [&'static str] = &[
        "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour", "OutlineColour",
        "BackColour", "Bold", "Italic", "Underline", "StrikeOut", "ScaleX", "ScaleY", "Spacing",
        "Angle", "BorderStyle", "Outline", "Shadow", "Alignment", "MarginL", "MarginR", "MarginV",
        "Encoding",
    ];

    const SSA_STYLES: &'static [&'static str] = &[
        "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour", "TertiaryColour",
        "BackColour", "Bold", "Italic", "BorderStyle", "Outline", "Shadow", "Alignment", "MarginL",
        "MarginR", "MarginV", "AlphaLevel", "Encoding",
    ];

    const ASS_EVENTS: &'static [&'static str] = &[
        "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
    ];

    const SSA_EVENTS: &'static [&'static str] = &[
        "Marked", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
    ];

    /// Parse the value of a `Format:` line
    pub fn parse(value: &str) -> Self {
        Self {
            fields: value
                .split(',')
                .map(|field| field.trim().to_string())
                .filter(|field| !field.is_empty())
                .collect(),
        }
    }

    fn from_names(names: &[&str]) -> Self {
        Self {
            fields: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Style format assumed when the styles section has no `Format:` line
    pub fn default_styles(variant: ScriptVariant) -> Self {
        match variant {
            ScriptVariant::Ass => Self::from_names(Self::ASS_STYLES),
            ScriptVariant::Ssa => Self::from_names(Self::SSA_STYLES),
        }
    }

    /// Event format assumed when the events section has no `Format:` line
    pub fn default_events(variant: ScriptVariant) -> Self {
        match variant {
            ScriptVariant::Ass => Self::from_names(Self::ASS_EVENTS),
            ScriptVariant::Ssa => Self::from_names(Self::SSA_EVENTS),
        }
    }

    /// Position of a field, matched case-insensitively
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.fields
    }
}

/// A parsed document: sections in the order they were encountered
#[derive(Debug, Clone, Default)]
pub struct SubtitleDocument {
    pub sections: Vec<Section>,
}

impl SubtitleDocument {
    /// All lines of every section of `kind`, in document order.
    ///
    /// Some authoring tools split a section in two (for instance a second
    /// `[Events]` block appended by a merge), so lookups never stop at the
    /// first match.
    pub fn lines(&self, kind: SectionKind) -> impl Iterator<Item = &FieldLine> + '_ {
        self.sections
            .iter()
            .filter(move |section| section.kind == kind)
            .flat_map(|section| section.lines.iter())
    }

    /// The `[Events]` format, or the variant's default when none is declared
    pub fn event_format(&self, variant: ScriptVariant) -> FieldFormat {
        self.section(&SectionKind::Events)
            .and_then(|section| section.format())
            .unwrap_or_else(|| FieldFormat::default_events(variant))
    }

    pub fn section(&self, kind: &SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| &section.kind == kind)
    }

    /// The first styles section, whichever flavour it is
    pub fn styles_section(&self) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind.is_styles())
    }

    /// Value of a `[Script Info]` property
    pub fn script_info(&self, key: &str) -> Option<&str> {
        self.lines(SectionKind::ScriptInfo)
            .find(|line| line.key.eq_ignore_ascii_case(key))
            .map(|line| line.value.trim())
    }

    /// Determine whether this is an ASS or SSA document.
    ///
    /// `ScriptType` wins, then the styles header flavour, then the caller's
    /// hint (usually derived from the file extension).
    pub fn variant(&self, hint: Option<ScriptVariant>) -> ScriptVariant {
        if let Some(script_type) = self.script_info("ScriptType") {
            let script_type = script_type.to_ascii_lowercase();
            if script_type.contains('+') {
                return ScriptVariant::Ass;
            }
            if script_type.starts_with("v4") {
                return ScriptVariant::Ssa;
            }
        }

        match self.styles_section().map(|section| &section.kind) {
            Some(SectionKind::V4Styles) => ScriptVariant::Ssa,
            Some(SectionKind::V4PlusStyles) => ScriptVariant::Ass,
            _ => hint.unwrap_or_default(),
        }
    }

    /// `WrapStyle` from `[Script Info]`; 0 when absent or invalid
    pub fn wrap_style(&self) -> u8 {
        self.script_info("WrapStyle")
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }
}

// @struct: Splits document text into sections
pub struct SectionReader;

impl SectionReader {
    /// Read a decoded document.
    ///
    /// Never fails: unknown lines are ignored, and a malformed header only
    /// empties the section it was meant to open.
    pub fn read(text: &str) -> SubtitleDocument {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut sections: Vec<Section> = Vec::new();
        // Lines after a malformed header are dropped until the next valid one
        let mut discarding = false;

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }

            let in_binary = !discarding && sections.last().is_some_and(|s| s.kind.is_binary());

            if line.starts_with('[') {
                match line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                    Some(name) => {
                        let kind = SectionKind::from_header(name);
                        // uuencoded payload may legitimately start with '['
                        if in_binary && matches!(kind, SectionKind::Unknown(_)) {
                            Self::push_raw(&mut sections, line, line_number);
                            continue;
                        }
                        debug!("Section [{}] at line {}", name.trim(), line_number);
                        sections.push(Section {
                            kind,
                            header: name.trim().to_string(),
                            lines: Vec::new(),
                        });
                        discarding = false;
                    }
                    None if in_binary => Self::push_raw(&mut sections, line, line_number),
                    None => {
                        warn!("Malformed section header at line {}: {}", line_number, line);
                        discarding = true;
                    }
                }
                continue;
            }

            if discarding {
                continue;
            }

            if in_binary {
                Self::push_raw(&mut sections, line, line_number);
                continue;
            }

            if line.starts_with(';') || line.starts_with("!:") {
                continue;
            }

            let Some(section) = sections.last_mut() else {
                debug!("Ignoring line {} outside of any section", line_number);
                continue;
            };

            match line.split_once(':') {
                Some((key, value)) if !key.trim().is_empty() => section.lines.push(FieldLine {
                    key: key.trim().to_string(),
                    value: value.trim_start().to_string(),
                    line_number,
                }),
                _ => debug!("Ignoring line {} without a field key: {}", line_number, line),
            }
        }

        SubtitleDocument { sections }
    }

    fn push_raw(sections: &mut [Section], line: &str, line_number: usize) {
        if let Some(section) = sections.last_mut() {
            section.lines.push(FieldLine {
                key: String::new(),
                value: line.to_string(),
                line_number,
            });
        }
    }
}
