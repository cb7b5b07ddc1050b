/*!
 * Timestamp model shared by the ASS/SSA reader and the SRT writer.
 *
 * Source documents store times as `H:MM:SS.cc` (centiseconds) or, for some
 * authoring tools, `H:MM:SS.mmm` (milliseconds). Everything is normalized to
 * milliseconds internally and rendered back as `HH:MM:SS,mmm` for SRT.
 */

use std::fmt;

use crate::errors::EventError;

/// Fractional precision used by a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBase {
    /// Two fractional digits (`0:00:01.50`)
    #[default]
    Centiseconds,
    /// Three fractional digits (`0:00:01.500`)
    Milliseconds,
}

impl TimeBase {
    /// Number of fractional digits this base expects
    pub fn fraction_digits(self) -> usize {
        match self {
            Self::Centiseconds => 2,
            Self::Milliseconds => 3,
        }
    }

    /// Milliseconds represented by one unit of the fractional field
    fn unit_ms(self) -> u64 {
        match self {
            Self::Centiseconds => 10,
            Self::Milliseconds => 1,
        }
    }

    /// Detect the base from a sample timestamp field.
    ///
    /// Only a three-digit fraction selects milliseconds; anything else,
    /// including a sample without a fraction, keeps the ASS default.
    pub fn detect(sample: &str) -> Self {
        let fraction = sample.trim().rsplit_once('.').map(|(_, f)| f);
        match fraction {
            Some(f) if f.len() == 3 && f.bytes().all(|b| b.is_ascii_digit()) => Self::Milliseconds,
            _ => Self::Centiseconds,
        }
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Centiseconds => write!(f, "centiseconds"),
            Self::Milliseconds => write!(f, "milliseconds"),
        }
    }
}

/// A point in time with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Parse an ASS/SSA time field (`H:MM:SS.f`) in the given base.
    ///
    /// The fraction may be shorter than the base width and is right-padded,
    /// so `0:00:01.5` is 1.5 seconds in either base. A fraction longer than
    /// the base width is rejected rather than silently truncated.
    pub fn parse(field: &str, base: TimeBase) -> Result<Self, EventError> {
        let field = field.trim();
        let invalid = || EventError::InvalidTimestamp {
            value: field.to_string(),
        };

        let mut parts = field.split(':');
        let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let (secs, fraction) = match s.split_once('.') {
            Some((secs, fraction)) => (secs, fraction),
            None => (s, ""),
        };

        let hours = parse_digits(h).ok_or_else(invalid)?;
        let minutes = parse_digits(m).ok_or_else(invalid)?;
        let seconds = parse_digits(secs).ok_or_else(invalid)?;

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        let width = base.fraction_digits();
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            if fraction.len() > width {
                return Err(invalid());
            }
            let value = parse_digits(fraction).ok_or_else(invalid)?;
            value * 10u64.pow((width - fraction.len()) as u32)
        };

        let millis = fraction_units.checked_mul(base.unit_ms()).ok_or_else(invalid)?;
        clock_millis(hours, minutes, seconds, millis).map(Timestamp).ok_or_else(invalid)
    }

    /// Format as SRT timestamp (HH:MM:SS,mmm)
    pub fn to_srt(self) -> String {
        let (hours, minutes, seconds, millis) = self.components();
        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Format as ASS timestamp (H:MM:SS.cc), truncating to centiseconds
    pub fn to_ass(self) -> String {
        let (hours, minutes, seconds, millis) = self.components();
        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10)
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm); a dot separator is tolerated
    pub fn parse_srt(field: &str) -> Option<Self> {
        let field = field.trim();
        let (clock, millis) = field.split_once([',', '.'])?;
        if millis.len() != 3 {
            return None;
        }
        let mut parts = clock.split(':');
        let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        let (hours, minutes, seconds) = (parse_digits(h)?, parse_digits(m)?, parse_digits(s)?);
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        clock_millis(hours, minutes, seconds, parse_digits(millis)?).map(Timestamp)
    }

    fn components(self) -> (u64, u64, u64, u64) {
        let ms = self.0;
        (ms / 3_600_000, (ms % 3_600_000) / 60_000, (ms % 60_000) / 1_000, ms % 1_000)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_srt())
    }
}

// None when the hour count does not fit in u64 milliseconds
fn clock_millis(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000)?
        .checked_add(millis)
}

// Strict ASCII digits; `str::parse` would also accept a leading '+'.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
