/*!
 * Integration tests for the file translation workflow
 */

use std::fs;
use std::sync::Arc;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

use gemsub::app_controller::{Controller, RunOptions, RunSummary};
use gemsub::providers::mock::MockProvider;
use gemsub::subtitle_processor::SubtitleCollection;
use crate::common;

fn controller(mock: &MockProvider) -> Result<Controller> {
    Controller::with_provider(common::fast_app_config(), Arc::new(mock.clone()))
}

#[tokio::test]
async fn test_run_withSingleFile_shouldWriteTranslatedSrtNextToInput() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "film.srt")?;
    let mock = MockProvider::echo();

    let summary = controller(&mock)?
        .run(&input, &RunOptions::default(), &CancellationToken::new())
        .await?;

    assert_eq!(summary, RunSummary { translated: 1, skipped: 0, failed: 0 });
    let written = fs::read_to_string(temp_dir.path().join("film.km.srt"))?;
    assert_eq!(
        written,
        "1\n00:00:01,000 --> 00:00:04,000\nThis is a test subtitle. [tr]\n\n\
         2\n00:00:05,000 --> 00:00:09,000\nIt contains multiple entries. [tr]\n\n\
         3\n00:00:10,000 --> 00:00:14,000\nFor testing purposes. [tr]\n\n"
    );
    assert!(mock.prompts()[0].contains("to Khmer."));
    Ok(())
}

#[tokio::test]
async fn test_run_withDirectory_shouldTranslateEverySrtIntoOutputDir() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("source");
    common::create_test_subtitle(&source, "a.srt")?;
    common::create_test_subtitle(&source, "nested/b.srt")?;
    common::create_test_file(&source, "readme.txt", "not a subtitle")?;
    let output_dir = temp_dir.path().join("translated");

    let options = RunOptions { output_dir: Some(output_dir.clone()), ..RunOptions::default() };
    let summary = controller(&MockProvider::echo())?
        .run(&source, &options, &CancellationToken::new())
        .await?;

    assert_eq!(summary.translated, 2);
    assert!(output_dir.join("a.km.srt").is_file());
    assert!(output_dir.join("nested/b.km.srt").is_file());
    Ok(())
}

#[tokio::test]
async fn test_run_withSameStemInDifferentFolders_shouldWriteSeparateOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = temp_dir.path().join("source");
    common::create_test_subtitle(&source, "s1/ep1.srt")?;
    common::create_test_file(&source, "s2/ep1.srt", "1\n00:00:01,000 --> 00:00:02,000\nSeason two\n")?;
    let output_dir = temp_dir.path().join("translated");

    let options = RunOptions { output_dir: Some(output_dir.clone()), ..RunOptions::default() };
    let summary = controller(&MockProvider::echo())?
        .run(&source, &options, &CancellationToken::new())
        .await?;

    assert_eq!(summary, RunSummary { translated: 2, skipped: 0, failed: 0 });
    assert_eq!(SubtitleCollection::parse_srt_file(&output_dir.join("s1/ep1.km.srt"))?.len(), 3);
    let season_two = SubtitleCollection::parse_srt_file(&output_dir.join("s2/ep1.km.srt"))?;
    assert_eq!(season_two[0].text, "Season two [tr]");
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "film.srt")?;
    let existing = common::create_test_file(temp_dir.path(), "film.km.srt", "keep me")?;
    let mock = MockProvider::echo();
    let controller = controller(&mock)?;

    let summary = controller.run(&input, &RunOptions::default(), &CancellationToken::new()).await?;
    assert_eq!(summary.skipped, 1);
    assert_eq!(fs::read_to_string(&existing)?, "keep me");
    assert_eq!(mock.request_count(), 0);

    let forced = RunOptions { force_overwrite: true, ..RunOptions::default() };
    let summary = controller.run(&input, &forced, &CancellationToken::new()).await?;
    assert_eq!(summary.translated, 1);
    assert_eq!(SubtitleCollection::parse_srt_file(&existing)?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyAndBrokenFiles_shouldCountThemAsFailed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "empty.srt", "")?;
    common::create_test_file(temp_dir.path(), "garbage.srt", "no subtitles in here\n")?;
    common::create_test_subtitle(temp_dir.path(), "good.srt")?;

    let summary = controller(&MockProvider::echo())?
        .run(temp_dir.path(), &RunOptions::default(), &CancellationToken::new())
        .await?;

    assert_eq!(summary, RunSummary { translated: 1, skipped: 0, failed: 2 });
    assert!(temp_dir.path().join("good.km.srt").is_file());
    assert!(!temp_dir.path().join("empty.km.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withValidationAndWithoutApiKey_shouldRejectUntranslatedOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "film.srt")?;
    let mut config = common::fast_app_config();
    config.translation.provider.api_key = String::new();
    let controller = Controller::with_provider(config, Arc::new(MockProvider::echo()))?;

    let lenient = controller.run(&input, &RunOptions::default(), &CancellationToken::new()).await?;
    assert_eq!(lenient.translated, 1);
    assert_eq!(fs::read_to_string(temp_dir.path().join("film.km.srt"))?, common::SAMPLE_SRT.to_string() + "\n");

    let strict = RunOptions { force_overwrite: true, validate: true, ..RunOptions::default() };
    assert!(controller.run(&input, &strict, &CancellationToken::new()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_whenCancelled_shouldFailWithoutWritingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "film.srt")?;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = controller(&MockProvider::echo())?
        .run(&input, &RunOptions::default(), &cancel)
        .await;

    let error = result.expect_err("cancelled run should fail");
    assert!(matches!(
        error.downcast_ref::<gemsub::errors::TranslationError>(),
        Some(gemsub::errors::TranslationError::Cancelled)
    ));
    assert!(!temp_dir.path().join("film.km.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = controller(&MockProvider::echo())?
        .run(&temp_dir.path().join("nope.srt"), &RunOptions::default(), &CancellationToken::new())
        .await;
    assert!(result.is_err());
    Ok(())
}
