/*!
 * Tests for dialogue event parsing
 */

use ass2srt::ass::{EventParser, ScriptVariant, SectionReader};
use ass2srt::timing::TimeBase;
use ass2srt::EventError;
use crate::common;

/// Test that only Dialogue lines become events, in source order
#[test]
fn test_parse_document_withMixedEventLines_shouldKeepDialogueOnly() {
    let text = common::ass_script(&[
        "Comment: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,hidden",
        "Dialogue: 0,0:00:03.00,0:00:04.00,Default,,0,0,0,,second in time",
        "Picture: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,image.png",
        "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,first in time",
    ]);
    let document = SectionReader::read(&text);
    let parser = EventParser::for_document(&document, ScriptVariant::Ass);
    let events = parser.parse_document(&document);

    assert_eq!(events.len(), 2);
    let texts: Vec<String> = events.iter().map(|e| e.result.as_ref().unwrap().text.clone()).collect();
    assert_eq!(texts, vec!["second in time", "first in time"]);
}

/// Test that the time base comes from the first dialogue line only
#[test]
fn test_for_document_withMillisecondTimes_shouldDetectOnce() {
    let text = common::ass_script(&[
        "Dialogue: 0,0:00:01.250,0:00:02.500,Default,,0,0,0,,millis",
        "Dialogue: 0,0:00:03.25,0:00:04.50,Default,,0,0,0,,short fraction",
    ]);
    let document = SectionReader::read(&text);
    let parser = EventParser::for_document(&document, ScriptVariant::Ass);
    let events = parser.parse_document(&document);

    assert_eq!(parser.time_base(), TimeBase::Milliseconds);
    let first = events[0].result.as_ref().unwrap();
    assert_eq!(first.start.as_millis(), 1_250);
    // Two digits under a millisecond base are right-padded
    let second = events[1].result.as_ref().unwrap();
    assert_eq!(second.start.as_millis(), 3_250);
}

/// Test that one broken line does not affect its neighbours
#[test]
fn test_parse_document_withBrokenLine_shouldIsolateFailure() {
    let text = common::ass_script(&[
        "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,ok",
        "Dialogue: 0,0:00:0x.00,0:00:02.00,Default,,0,0,0,,bad time",
        "Dialogue: 0,0:00:03.00",
        "Dialogue: 0,0:00:05.00,0:00:06.00,Default,,0,0,0,,also ok",
    ]);
    let document = SectionReader::read(&text);
    let events = EventParser::for_document(&document, ScriptVariant::Ass).parse_document(&document);

    assert_eq!(events.len(), 4);
    assert!(events[0].result.is_ok());
    assert!(matches!(events[1].result, Err(EventError::InvalidTimestamp { .. })));
    assert_eq!(events[2].result, Err(EventError::WrongFieldCount { expected: 10, found: 2 }));
    assert!(events[3].result.is_ok());
}

/// Test a custom format with reordered columns
#[test]
fn test_parse_document_withReorderedFormat_shouldFollowFormat() {
    let text = "[Events]\n\
        Format: Start, End, Text\n\
        Dialogue: 0:00:01.00,0:00:02.00,Hello, with commas\n";
    let document = SectionReader::read(text);
    let events = EventParser::for_document(&document, ScriptVariant::Ass).parse_document(&document);

    let event = events[0].result.as_ref().unwrap();
    assert_eq!(event.text, "Hello, with commas");
    assert_eq!(event.style, "");
    assert_eq!(event.layer, 0);
}

/// Test that a missing format line falls back to the variant default
#[test]
fn test_parse_document_withoutFormat_shouldUseSsaDefault() {
    let text = "[Events]\n\
        Dialogue: Marked=0,0:00:01.18,0:00:06.85,Default,NTP,0000,0000,0000,!Effect,Text here\n";
    let document = SectionReader::read(text);
    let events = EventParser::for_document(&document, ScriptVariant::Ssa).parse_document(&document);

    let event = events[0].result.as_ref().unwrap();
    assert_eq!(event.start.as_millis(), 1_180);
    assert_eq!(event.name, "NTP");
    assert_eq!(event.effect, "!Effect");
    assert_eq!(event.text, "Text here");
}

/// Test that an events format without Text makes every line malformed
#[test]
fn test_parse_document_withFormatMissingText_shouldFailEveryLine() {
    let text = "[Events]\nFormat: Layer, Start, End\nDialogue: 0,0:00:01.00,0:00:02.00\n";
    let document = SectionReader::read(text);
    let events = EventParser::for_document(&document, ScriptVariant::Ass).parse_document(&document);

    assert_eq!(events[0].result, Err(EventError::MissingField("Text")));
}
