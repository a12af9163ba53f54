/*!
 * Tests for prompts, response reconciliation and the batch worker
 */

use std::sync::Arc;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

use gemsub::providers::mock::MockProvider;
use gemsub::subtitle_processor::SubtitleEntry;
use gemsub::translation::response::{self, SEPARATOR};
use gemsub::translation::{TranslationPromptBuilder, TranslationService, create_batches};
use crate::common::{self, mock_providers};

fn translations(entries: &[SubtitleEntry]) -> Vec<String> {
    entries.iter().map(|e| e.translated_text.clone().unwrap_or_default()).collect()
}

#[test]
fn test_prompt_builder_withBatch_shouldContainHeaderRulesAndLines() {
    let entries = common::sample_entries(3);
    let prompt = TranslationPromptBuilder::new("Khmer").with_entries(&entries).build();

    assert!(prompt.starts_with("Translate the following 3 subtitle lines to Khmer."));
    assert!(prompt.contains("separated by '|||'"));
    assert!(prompt.contains("Maintain the exact same order as the input."));
    assert!(prompt.contains("FORMAT EXAMPLE:"));
    assert!(prompt.contains("You must provide exactly 3 translations separated by |||."));
    assert!(prompt.ends_with("1. \"line 1\"\n2. \"line 2\"\n3. \"line 3\"\n"));
    assert_eq!(MockProvider::prompt_lines(&prompt), vec!["line 1", "line 2", "line 3"]);
}

/// Well-formed response
#[test]
fn test_reconcile_withWellFormedResponse_shouldTranslateEveryEntry() {
    let batch = vec![
        SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", "Hello"),
        SubtitleEntry::new(2, "00:00:03,000", "00:00:04,000", "World"),
    ];
    let output = response::reconcile(&batch, "សួស្តី|||ពិភពលោក");

    assert_eq!(translations(&output), vec!["សួស្តី", "ពិភពលោក"]);
    assert_eq!(output[0].start_time, "00:00:01,000");
}

/// Missing separator
#[test]
fn test_reconcile_withNewlineSeparatedResponse_shouldFallBackToLines() {
    let batch = common::sample_entries(2);
    let output = response::reconcile(&batch, "A\nB\n");
    assert_eq!(translations(&output), vec!["A", "B"]);
}

/// Short response
#[test]
fn test_reconcile_withTooFewSegments_shouldMarkMissingPositions() {
    let batch = vec![
        SubtitleEntry::new(1, "00:00:01,000", "00:00:02,000", "one"),
        SubtitleEntry::new(2, "00:00:03,000", "00:00:04,000", "two"),
        SubtitleEntry::new(3, "00:00:05,000", "00:00:06,000", "three"),
    ];
    let output = response::reconcile(&batch, "X|||Y");
    assert_eq!(translations(&output), vec!["X", "Y", "three [No Translation in Fallback]"]);
}

#[test]
fn test_reconcile_withArbitraryText_shouldAlwaysReturnBatchLength() {
    let batch = common::sample_entries(4);
    let responses = [
        "", "|||", "||||||||||||||||||", "only one", "1.\n2.\n3.", "a|||b|||c|||d|||e|||f",
        "\n\n\n", "1. a\n2. b\n3. c\n4. d\n5. e",
    ];

    for text in responses {
        let output = response::reconcile(&batch, text);
        assert_eq!(output.len(), batch.len(), "response {:?}", text);
        for (input, output) in batch.iter().zip(&output) {
            assert_eq!(input.seq_num, output.seq_num);
            assert!(output.translated_text.is_some());
        }
    }
}

#[test]
fn test_reconcile_withNSeparatedSegments_shouldFillNSlots() {
    let batch = common::sample_entries(5);
    let text = ["a", "b", "c", "d", "e"].join(SEPARATOR);
    let output = response::reconcile(&batch, &text);
    assert_eq!(translations(&output), vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_create_batches_shouldPartitionContiguously() {
    let entries = common::sample_entries(11);
    let batches = create_batches(&entries, 4);

    assert_eq!(batches.len(), 3);
    assert_eq!(batches[2].len(), 3);
    assert_eq!(batches.concat(), entries);
}

#[tokio::test]
async fn test_translation_service_withRetryableFailures_shouldRecover() -> Result<()> {
    common::init_logger();
    let mock = mock_providers::flaky(503, 2, "uno|||dos");
    let config = common::fast_pipeline_config(2, 1);
    let service = TranslationService::with_provider(Arc::new(mock.clone()), &config);

    let output = service.translate_batch(&common::sample_entries(2), &CancellationToken::new()).await?;

    assert_eq!(translations(&output), vec!["uno", "dos"]);
    assert_eq!(mock.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_translation_service_withExhaustedRetries_shouldMarkApiError() -> Result<()> {
    let mock = MockProvider::failing(502);
    let mut config = common::fast_pipeline_config(2, 1);
    config.max_retries = 1;
    let service = TranslationService::with_provider(Arc::new(mock.clone()), &config);

    let output = service.translate_batch(&common::sample_entries(2), &CancellationToken::new()).await?;

    assert_eq!(translations(&output), vec!["line 1 [API Error]", "line 2 [API Error]"]);
    assert_eq!(mock.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_translation_service_shouldPromptInTargetLanguage() -> Result<()> {
    let mock = MockProvider::echo();
    let mut config = common::fast_pipeline_config(2, 1);
    config.target_language = "Brazilian Portuguese".to_string();
    let service = TranslationService::with_provider(Arc::new(mock.clone()), &config);

    service.translate_batch(&common::sample_entries(1), &CancellationToken::new()).await?;

    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Translate the following 1 subtitle lines to Brazilian Portuguese."));
    Ok(())
}

#[test]
fn test_translation_service_withBlockingRuntime_shouldTranslateBatch() -> Result<()> {
    let mock = MockProvider::echo();
    let service = TranslationService::with_provider(Arc::new(mock.clone()), &common::fast_pipeline_config(3, 1));
    let batch = common::sample_entries(3);

    let output = tokio_test::block_on(async {
        service.translate_batch(&batch, &CancellationToken::new()).await
    })?;

    assert_eq!(translations(&output), vec!["line 1 [tr]", "line 2 [tr]", "line 3 [tr]"]);
    assert_eq!(mock.request_count(), 1);
    Ok(())
}
