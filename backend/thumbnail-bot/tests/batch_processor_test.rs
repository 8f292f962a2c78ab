//! Integration tests for the batch file processor
//!
//! These tests verify:
//! 1. A failing transfer never blocks or cancels its siblings
//! 2. Local copies are removed after success and after failure
//! 3. Transfers run concurrently, and the batch waits for all of them

mod common;

use bytes::Bytes;
use common::FakePlatform;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use thumbnail_bot::models::{ChatId, FileHandle, IncomingFileTransfer, PreparedThumbnail};
use thumbnail_bot::services::BatchFileProcessor;
use thumbnail_bot::BotError;

const CHAT: ChatId = ChatId(1001);

fn thumbnail() -> Arc<PreparedThumbnail> {
    Arc::new(PreparedThumbnail {
        source_reference: PathBuf::from("thumb.jpg"),
        path: PathBuf::from("thumb.jpg_resized.jpg"),
        bounded_image_bytes: Bytes::from_static(b"\xFF\xD8fake-jpeg"),
        width: 320,
        height: 320,
    })
}

fn transfers(n: usize) -> Vec<IncomingFileTransfer> {
    (0..n)
        .map(|i| IncomingFileTransfer {
            remote_file_handle: FileHandle::new(format!("file-{i}")),
            declared_file_name: format!("part-{i}.zip"),
        })
        .collect()
}

fn setup() -> (TempDir, Arc<FakePlatform>, BatchFileProcessor) {
    let dir = TempDir::new().unwrap();
    let platform = Arc::new(FakePlatform::new(&dir.path().join("downloads")));
    let processor = BatchFileProcessor::new(platform.clone());
    (dir, platform, processor)
}

#[tokio::test]
async fn test_failed_download_does_not_affect_siblings() {
    let (_dir, platform, processor) = setup();
    platform.fail_download("file-2");

    let report = processor.process(CHAT, thumbnail(), transfers(5)).await;

    assert_eq!(report.total(), 5);
    assert_eq!(report.succeeded(), 4);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcomes[2].result,
        Err(BotError::DownloadFailed { .. })
    ));

    let mut uploaded: Vec<_> = platform
        .documents()
        .into_iter()
        .map(|d| d.file_name)
        .collect();
    uploaded.sort();
    assert_eq!(
        uploaded,
        vec!["part-0.zip", "part-1.zip", "part-3.zip", "part-4.zip"]
    );
    assert!(platform
        .messages()
        .iter()
        .any(|m| m.contains("Failed to download part-2.zip")));
}

#[tokio::test]
async fn test_outcomes_follow_input_order() {
    let (_dir, platform, processor) = setup();
    platform.delay_download("file-0", Duration::from_millis(150));

    let report = processor.process(CHAT, thumbnail(), transfers(3)).await;

    let names: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| o.file_name.as_str())
        .collect();
    assert_eq!(names, vec!["part-0.zip", "part-1.zip", "part-2.zip"]);
    assert!(report.all_succeeded());
}

#[tokio::test]
async fn test_local_copies_removed_on_success_and_failure() {
    let (_dir, platform, processor) = setup();
    platform.fail_upload("part-1.zip");

    let report = processor.process(CHAT, thumbnail(), transfers(3)).await;

    assert_eq!(report.succeeded(), 2);
    assert!(matches!(
        report.outcomes[1].result,
        Err(BotError::UploadFailed { .. })
    ));

    let downloads = platform.downloads();
    assert_eq!(downloads.len(), 3);
    for path in downloads {
        assert!(!path.exists(), "{} was left behind", path.display());
    }
}

#[tokio::test]
async fn test_uploads_carry_thumbnail_name_and_caption() {
    let (_dir, platform, processor) = setup();

    processor.process(CHAT, thumbnail(), transfers(1)).await;

    let documents = platform.documents();
    assert_eq!(documents.len(), 1);
    let doc = &documents[0];
    assert_eq!(doc.chat, CHAT);
    assert_eq!(doc.file_name, "part-0.zip");
    assert_eq!(doc.thumbnail, thumbnail().bounded_image_bytes);
    assert!(doc.caption.contains("part-0.zip"));
    assert_eq!(doc.content_len, "remote:file-0".len());
}

#[tokio::test]
async fn test_transfers_run_concurrently() {
    let (_dir, platform, processor) = setup();
    for i in 0..4 {
        platform.delay_download(&format!("file-{i}"), Duration::from_millis(300));
    }

    let started = Instant::now();
    let report = processor.process(CHAT, thumbnail(), transfers(4)).await;
    let elapsed = started.elapsed();

    assert!(report.all_succeeded());
    assert!(
        elapsed < Duration::from_millis(900),
        "batch took {elapsed:?}, transfers were not concurrent"
    );
}

#[tokio::test]
async fn test_batch_waits_for_slowest_transfer() {
    let (_dir, platform, processor) = setup();
    platform.delay_download("file-1", Duration::from_millis(200));
    platform.fail_download("file-2");

    let report = processor.process(CHAT, thumbnail(), transfers(3)).await;

    assert_eq!(report.total(), 3);
    assert_eq!(platform.documents().len(), 2);
    assert!(platform
        .documents()
        .iter()
        .any(|d| d.file_name == "part-1.zip"));
}

#[tokio::test]
async fn test_progress_notices_for_one_file() {
    let (_dir, platform, processor) = setup();

    processor.process(CHAT, thumbnail(), transfers(1)).await;

    assert_eq!(
        platform.messages(),
        vec![
            "⏳ Downloading part-0.zip...".to_string(),
            "✅ part-0.zip downloaded successfully!".to_string(),
            "⏳ Uploading part-0.zip with the custom thumbnail...".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_download_skips_upload_notices() {
    let (_dir, platform, processor) = setup();
    platform.fail_download("file-0");

    processor.process(CHAT, thumbnail(), transfers(1)).await;

    assert_eq!(
        platform.messages(),
        vec![
            "⏳ Downloading part-0.zip...".to_string(),
            "❌ Failed to download part-0.zip.".to_string(),
        ]
    );
}
