/*!
 * Reader for ASS/SSA subtitle documents.
 *
 * - `sections`: splits a document into typed sections and field lines
 * - `styles`: style records and the per-document style table
 * - `events`: dialogue lines to timed events
 * - `sanitizer`: override-tag removal and line splitting
 */

pub mod events;
pub mod sanitizer;
pub mod sections;
pub mod styles;

pub use self::events::{DialogueEvent, EventLine, EventParser, EventResult};
pub use self::sanitizer::{SanitizedText, TextSanitizer};
pub use self::sections::{FieldFormat, FieldLine, ScriptVariant, Section, SectionKind, SectionReader, SubtitleDocument};
pub use self::styles::{Alignment, Colour, StyleRecord, StyleTable};
