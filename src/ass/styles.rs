/*!
 * Style table for a single document.
 *
 * Styles never influence the SRT text, but events and `\r` override tags
 * refer to them by name, and a converter that trips over a dangling
 * reference would lose captions. The table therefore always has an answer:
 * the named style, or the fallback `Default` style.
 */

use std::collections::HashMap;

use log::debug;

use super::sections::{FieldFormat, ScriptVariant, SubtitleDocument};

/// Colour in ASS byte order (alpha, blue, green, red from high to low)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Colour(pub u32);

impl Colour {
    pub const WHITE: Colour = Colour(0x00FF_FFFF);
    pub const RED: Colour = Colour(0x0000_00FF);
    pub const BLACK: Colour = Colour(0x0000_0000);

    /// Parse `&HAABBGGRR`, `&HBBGGRR`, shorthand forms like `&H0`, or a
    /// decimal value as written by SSA tools. A trailing `&` is allowed.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let value = value.strip_suffix('&').unwrap_or(value);

        let hex = value
            .strip_prefix("&H")
            .or_else(|| value.strip_prefix("&h"))
            .or_else(|| value.strip_prefix('H'))
            .or_else(|| value.strip_prefix('h'));

        match hex {
            Some(digits) if !digits.is_empty() && digits.len() <= 8 => u32::from_str_radix(digits, 16).ok().map(Colour),
            Some(_) => None,
            None => value.parse::<i64>().ok().map(|v| Colour(v as u32)),
        }
    }

    pub fn red(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn blue(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xFF) as u8
    }
}

/// Numpad-style alignment (1 = bottom left ... 9 = top right)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment(pub u8);

impl Default for Alignment {
    fn default() -> Self {
        Alignment(2)
    }
}

impl Alignment {
    /// Interpret an alignment field for the given variant.
    ///
    /// SSA uses 1-3 for bottom, +4 for top and +8 for middle.
    pub fn parse(value: &str, variant: ScriptVariant) -> Option<Self> {
        let code: u8 = value.trim().parse().ok()?;
        match variant {
            ScriptVariant::Ass if (1..=9).contains(&code) => Some(Alignment(code)),
            ScriptVariant::Ass => None,
            ScriptVariant::Ssa => {
                let horizontal = code & 3;
                if horizontal == 0 || code > 11 {
                    return None;
                }
                let row = if code & 4 != 0 {
                    6
                } else if code & 8 != 0 {
                    3
                } else {
                    0
                };
                Some(Alignment(horizontal + row))
            }
        }
    }
}

/// One `Style:` definition
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    pub name: String,
    pub font_name: String,
    pub font_size: f32,
    pub primary_colour: Colour,
    pub secondary_colour: Colour,
    /// `OutlineColour` in ASS, `TertiaryColour` in SSA
    pub outline_colour: Colour,
    pub back_colour: Colour,
    pub bold: bool,
    pub italic: bool,
    pub alignment: Alignment,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            name: StyleTable::DEFAULT_STYLE.to_string(),
            font_name: "Arial".to_string(),
            font_size: 20.0,
            primary_colour: Colour::WHITE,
            secondary_colour: Colour::RED,
            outline_colour: Colour::BLACK,
            back_colour: Colour::BLACK,
            bold: false,
            italic: false,
            alignment: Alignment::default(),
        }
    }
}

impl StyleRecord {
    /// Build a record from the value of a `Style:` line.
    ///
    /// Returns `None` only when the line has no usable name; every other
    /// field falls back to its default.
    pub fn parse(value: &str, format: &FieldFormat, variant: ScriptVariant) -> Option<Self> {
        let fields: Vec<&str> = value.splitn(format.len().max(1), ',').map(str::trim).collect();
        let field = |name: &str| format.index_of(name).and_then(|i| fields.get(i).copied());

        let name = field("Name").filter(|name| !name.is_empty())?;
        let defaults = StyleRecord::default();

        let colour = |names: &[&str], fallback: Colour| {
            let raw = names.iter().find_map(|name| field(name));
            match raw {
                Some(raw) => Colour::parse(raw).unwrap_or_else(|| {
                    debug!("Style '{}': unreadable colour '{}', using default", name, raw);
                    fallback
                }),
                None => fallback,
            }
        };

        Some(StyleRecord {
            name: name.to_string(),
            font_name: field("Fontname")
                .filter(|font| !font.is_empty())
                .map_or(defaults.font_name.clone(), str::to_string),
            font_size: field("Fontsize")
                .and_then(|size| size.parse().ok())
                .unwrap_or(defaults.font_size),
            primary_colour: colour(&["PrimaryColour"], defaults.primary_colour),
            secondary_colour: colour(&["SecondaryColour"], defaults.secondary_colour),
            outline_colour: colour(&["OutlineColour", "TertiaryColour"], defaults.outline_colour),
            back_colour: colour(&["BackColour"], defaults.back_colour),
            bold: field("Bold").is_some_and(parse_flag),
            italic: field("Italic").is_some_and(parse_flag),
            alignment: field("Alignment")
                .and_then(|value| Alignment::parse(value, variant))
                .unwrap_or_default(),
        })
    }
}

// ASS writes -1 for true; some tools write 1.
fn parse_flag(value: &str) -> bool {
    value.parse::<i32>().is_ok_and(|flag| flag != 0)
}

/// Styles of one document, owned by a single conversion
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: Vec<StyleRecord>,
    by_name: HashMap<String, usize>,
    fallback: StyleRecord,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            styles: Vec::new(),
            by_name: HashMap::new(),
            fallback: StyleRecord::default(),
        }
    }
}

impl StyleTable {
    pub const DEFAULT_STYLE: &'static str = "Default";

    /// Collect the styles of a document
    pub fn from_document(document: &SubtitleDocument, variant: ScriptVariant) -> Self {
        let mut table = StyleTable::default();

        let Some(section) = document.styles_section() else {
            debug!("No styles section, every event uses the built-in default style");
            return table;
        };

        let format = section.format().unwrap_or_else(|| FieldFormat::default_styles(variant));

        // Styles split across several sections are merged
        for line in document.lines(section.kind.clone()).filter(|line| line.key.eq_ignore_ascii_case("Style")) {
            match StyleRecord::parse(&line.value, &format, variant) {
                Some(style) => table.insert(style),
                None => debug!("Skipping style without a name at line {}", line.line_number),
            }
        }

        if let Some(default) = table.get(Self::DEFAULT_STYLE).cloned() {
            table.fallback = default;
        }

        table
    }

    /// Add a style; a later definition with the same name replaces the earlier one
    pub fn insert(&mut self, style: StyleRecord) {
        match self.by_name.get(&style.name) {
            Some(&index) => {
                debug!("Style '{}' defined twice, keeping the last definition", style.name);
                self.styles[index] = style;
            }
            None => {
                self.by_name.insert(style.name.clone(), self.styles.len());
                self.styles.push(style);
            }
        }
    }

    /// Find a style by name.
    ///
    /// Legacy SSA files prefix names with `*`; renderers also match names
    /// case-insensitively, so both are tried after the exact name.
    pub fn get(&self, name: &str) -> Option<&StyleRecord> {
        let name = name.trim();
        let name = name.strip_prefix('*').unwrap_or(name);

        self.by_name
            .get(name)
            .or_else(|| {
                self.by_name
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, index)| index)
            })
            .map(|&index| &self.styles[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Find a style by name, falling back to the default style
    pub fn lookup(&self, name: &str) -> &StyleRecord {
        self.get(name).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &StyleRecord {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Styles in definition order
    pub fn iter(&self) -> impl Iterator<Item = &StyleRecord> {
        self.styles.iter()
    }
}
