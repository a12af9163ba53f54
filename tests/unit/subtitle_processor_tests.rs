/*!
 * Tests for SRT parsing and emission
 */

use anyhow::Result;
use gemsub::errors::SubtitleError;
use gemsub::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::common;

/// Blank lines, CRLF endings, dot separators and multi-line text in one document
#[test]
fn test_parse_srt_string_withMixedFormatting_shouldNormalizeEntries() {
    let content = "\u{feff}junk before\r\n1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n\r\n2\r\n00:00:03.000 --> 00:00:04.500\r\nWorld\r\nagain\r\n";
    let entries = SubtitleCollection::parse_srt_string(content);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", "Hello"));
    assert_eq!(entries[1].start_time, "00:00:03,000");
    assert_eq!(entries[1].end_time, "00:00:04,500");
    assert_eq!(entries[1].text, "World\nagain");
}

#[test]
fn test_parse_srt_string_withMalformedTimestamp_shouldAbandonOnlyThatBlock() {
    let content = "1\n00:00:01 --> 00:00:02\nBroken\n\n2\n00:00:03,000 --> 00:00:04,000\nFine\n";
    let entries = SubtitleCollection::parse_srt_string(content);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].seq_num, 2);
    assert_eq!(entries[0].text, "Fine");
}

#[test]
fn test_parse_srt_string_withZeroSequence_shouldSkipBlock() {
    let content = "0\n00:00:01,000 --> 00:00:02,000\nZero\n\n3\n00:00:03,000 --> 00:00:04,000\nThree\n";
    let entries = SubtitleCollection::parse_srt_string(content);

    assert_eq!(entries.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![3]);
}

#[test]
fn test_parse_srt_bytes_withWindows1252_shouldDecodeAccents() -> Result<()> {
    let mut bytes = b"1\r\n00:00:01,000 --> 00:00:02,000\r\n".to_vec();
    // "Déjà vu, garçon. Où est le café?" in windows-1252
    bytes.extend_from_slice(b"D\xe9j\xe0 vu, gar\xe7on. O\xf9 est le caf\xe9?\r\n");
    let entries = SubtitleCollection::parse_srt_bytes(&bytes, "legacy.srt")?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Déjà vu, garçon. Où est le café?");
    Ok(())
}

#[test]
fn test_parse_srt_bytes_withEmptyInput_shouldFail() {
    let result = SubtitleCollection::parse_srt_bytes(&[], "empty.srt");
    assert!(matches!(result, Err(SubtitleError::EmptyInput { name }) if name == "empty.srt"));
}

#[test]
fn test_parse_srt_file_withDirectory_shouldReportSkipped() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = SubtitleCollection::parse_srt_file(temp_dir.path());
    assert!(matches!(result, Err(SubtitleError::Skipped { .. })));
    Ok(())
}

#[test]
fn test_parse_srt_file_withMissingFile_shouldReportIoFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = SubtitleCollection::parse_srt_file(&temp_dir.path().join("missing.srt"));
    assert!(matches!(result, Err(SubtitleError::IoFailure { .. })));
    Ok(())
}

#[test]
fn test_parse_many_withBadInputs_shouldKeepGoodFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let good = common::create_test_subtitle(temp_dir.path(), "good.srt")?;
    let empty = common::create_test_file(temp_dir.path(), "empty.srt", "")?;
    let missing = temp_dir.path().join("missing.srt");
    let directory = temp_dir.path().to_path_buf();

    let entries = SubtitleCollection::parse_many(&[empty, good.clone(), missing, directory, good]);

    assert_eq!(entries.len(), 6);
    assert_eq!(entries[3].text, "This is a test subtitle.");
    Ok(())
}

#[test]
fn test_to_srt_string_withTranslations_shouldEmitTranslatedText() {
    let entries = vec![
        SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", "Hello").with_translation("សួស្តី"),
        SubtitleEntry::new(2, "00:00:03,000", "00:00:04,000", "Bye"),
    ];

    assert_eq!(
        SubtitleCollection::to_srt_string(&entries),
        "1\n00:00:01,000 --> 00:00:02,000\nសួស្តី\n\n2\n00:00:03,000 --> 00:00:04,000\nBye\n\n"
    );
}

#[test]
fn test_emission_afterReparse_shouldBeStable() {
    let first = SubtitleCollection::to_srt_string(&SubtitleCollection::parse_srt_string(common::SAMPLE_SRT));
    let second = SubtitleCollection::to_srt_string(&SubtitleCollection::parse_srt_string(&first));

    assert_eq!(first, second);
    assert_eq!(SubtitleCollection::parse_srt_string(&first).len(), 3);
}

#[test]
fn test_generate_with_validation_withUntranslatedEntry_shouldNameSequence() {
    let entries = vec![
        SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", "a").with_translation("A"),
        SubtitleEntry::new(2, "00:00:03,000", "00:00:04,000", "b"),
    ];

    let result = SubtitleCollection::generate_with_validation(&entries);
    assert!(matches!(result, Err(SubtitleError::InvalidEntry { sequence: 2 })));
}

#[test]
fn test_write_to_srt_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("out/deeper/film.km.srt");
    let collection = SubtitleCollection {
        source_file: temp_dir.path().join("film.srt"),
        entries: vec![SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", "a").with_translation("A")],
    };

    collection.write_to_srt(&target, true)?;

    assert_eq!(std::fs::read_to_string(&target)?, "1\n00:00:01,000 --> 00:00:02,000\nA\n\n");
    Ok(())
}
