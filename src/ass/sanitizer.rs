/*!
 * Plain-text cleanup of dialogue text.
 *
 * ASS text mixes display text with `{...}` override blocks and backslash
 * escapes. SRT output only keeps the display text, split into lines at
 * forced breaks. Bilingual releases put each language on its own line with
 * `\N`, so every segment is kept, in order.
 */

use log::debug;

use super::styles::StyleTable;

/// Display lines extracted from one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedText {
    pub lines: Vec<String>,
    /// `\r<Style>` resets naming a style the document does not define
    pub dangling_resets: usize,
}

impl SanitizedText {
    /// True when nothing displayable is left
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// @struct: Strips override codes using the document's styles and wrap mode
pub struct TextSanitizer<'a> {
    styles: &'a StyleTable,
    // \n is only a line break under WrapStyle 2
    soft_breaks_are_hard: bool,
}

impl<'a> TextSanitizer<'a> {
    pub fn new(styles: &'a StyleTable, wrap_style: u8) -> Self {
        Self {
            styles,
            soft_breaks_are_hard: wrap_style == 2,
        }
    }

    /// Convert raw event text into display lines
    pub fn sanitize(&self, raw: &str) -> SanitizedText {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut drawing = false;
        let mut dangling_resets = 0;

        let mut rest = raw;
        while let Some(c) = rest.chars().next() {
            match c {
                '{' => {
                    // An unterminated block swallows the rest of the text
                    let (block, after) = match rest[1..].find('}') {
                        Some(close) => (&rest[1..close + 1], &rest[close + 2..]),
                        None => (&rest[1..], ""),
                    };
                    self.apply_overrides(block, &mut drawing, &mut dangling_resets);
                    rest = after;
                    continue;
                }
                '\\' => {
                    let escape = rest[1..].chars().next();
                    match escape {
                        Some('N') => lines.push(std::mem::take(&mut current)),
                        Some('n') if self.soft_breaks_are_hard => lines.push(std::mem::take(&mut current)),
                        Some('n') | Some('h') => {
                            if !drawing {
                                current.push(' ');
                            }
                        }
                        _ => {
                            if !drawing {
                                current.push('\\');
                            }
                            rest = &rest[1..];
                            continue;
                        }
                    }
                    rest = &rest[2..];
                    continue;
                }
                _ => {
                    if !drawing {
                        current.push(c);
                    }
                }
            }
            rest = &rest[c.len_utf8()..];
        }
        lines.push(current);

        SanitizedText {
            lines: lines
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            dangling_resets,
        }
    }

    /// Interpret the tags of one override block that affect plain text
    fn apply_overrides(&self, block: &str, drawing: &mut bool, dangling_resets: &mut usize) {
        // Text before the first backslash is a comment
        for tag in block.split('\\').skip(1) {
            let tag = tag.trim();
            if let Some(level) = tag.strip_prefix('p') {
                if let Ok(level) = level.parse::<u32>() {
                    *drawing = level > 0;
                }
            } else if let Some(name) = tag.strip_prefix('r') {
                let name = name.trim();
                if !name.is_empty() && !self.styles.contains(name) {
                    debug!("Override resets to unknown style '{}', using default", name);
                    *dangling_resets += 1;
                }
            }
        }
    }
}
