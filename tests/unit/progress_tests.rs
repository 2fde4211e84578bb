/*!
 * Tests for the progress tracker
 */

use std::time::Duration;

use subvocab::progress::{ProgressTracker, Stage};

fn short_lived_tracker() -> ProgressTracker {
    ProgressTracker::new(Duration::from_millis(50), Duration::from_millis(300))
}

#[test]
fn test_start_shouldCreateStartingEntry() {
    let tracker = ProgressTracker::default();
    tracker.start("file-1", 100);

    let state = tracker.get("file-1").unwrap();
    assert_eq!(state.stage, Stage::Starting);
    assert_eq!(state.current_word, 0);
    assert_eq!(state.total_words, 100);
    assert_eq!(state.message, "Starting vocabulary extraction...");
    assert!(tracker.is_processing("file-1"));
}

#[test]
fn test_getPercentage_withUnknownFile_shouldReturnZero() {
    let tracker = ProgressTracker::default();
    assert_eq!(tracker.get_percentage("missing"), 0);
    assert!(!tracker.is_processing("missing"));
}

#[test]
fn test_getPercentage_duringJob_shouldNeverDecreaseAndReachHundredOnComplete() {
    let tracker = ProgressTracker::default();
    tracker.start("file", 100);
    tracker.update("file", Stage::Processing, 0, "Analyzing Japanese text...");
    tracker.set_total("file", 7);

    let mut last = tracker.get_percentage("file");
    for current in 1..=7 {
        tracker.update("file", Stage::LookingUp, current, "Looking up");
        let percentage = tracker.get_percentage("file");
        assert!(percentage >= last, "{} dropped below {}", percentage, last);
        assert!(percentage <= 99);
        last = percentage;
    }

    tracker.complete("file", 6);
    assert_eq!(tracker.get_percentage("file"), 100);
}

#[test]
fn test_getPercentage_withZeroTotal_shouldReturnZeroUntilComplete() {
    let tracker = ProgressTracker::default();
    tracker.start("empty", 0);
    assert_eq!(tracker.get_percentage("empty"), 0);

    tracker.complete("empty", 0);
    assert_eq!(tracker.get_percentage("empty"), 100);
}

#[test]
fn test_complete_shouldSetTerminalStateAndMessage() {
    let tracker = ProgressTracker::default();
    tracker.start("file", 10);
    tracker.complete("file", 8);

    let state = tracker.get("file").unwrap();
    assert_eq!(state.stage, Stage::Complete);
    assert_eq!(state.current_word, state.total_words);
    assert_eq!(state.message, "Complete! Added 8 words to vocabulary.");
    assert!(!tracker.is_processing("file"));
}

#[test]
fn test_error_shouldPrefixMessage() {
    let tracker = ProgressTracker::default();
    tracker.start("file", 10);
    tracker.error("file", "database unreachable");

    let state = tracker.get("file").unwrap();
    assert_eq!(state.stage, Stage::Error);
    assert_eq!(state.message, "Error: database unreachable");
}

#[test]
fn test_update_withUnknownFile_shouldBeIgnored() {
    let tracker = ProgressTracker::default();
    tracker.update("ghost", Stage::Processing, 3, "nothing");
    tracker.complete("ghost", 3);

    assert!(tracker.get("ghost").is_none());
    assert!(tracker.is_empty());
}

#[test]
fn test_tryStart_whileRunning_shouldRefuse() {
    let tracker = ProgressTracker::default();

    assert!(tracker.try_start("file", 100));
    assert!(!tracker.try_start("file", 100));

    tracker.complete("file", 1);
    assert!(tracker.try_start("file", 100));
}

#[tokio::test]
async fn test_complete_afterTtl_shouldExpireEntry() {
    let tracker = short_lived_tracker();
    tracker.start("file", 4);
    tracker.complete("file", 4);
    assert!(tracker.get("file").is_some());

    tokio::time::sleep(Duration::from_millis(120)).await;

    assert!(tracker.get("file").is_none());
    assert_eq!(tracker.get_percentage("file"), 0);
    assert_eq!(tracker.len(), 0);
}

#[tokio::test]
async fn test_error_shouldOutliveCompleteTtl() {
    let tracker = short_lived_tracker();
    tracker.start("failed", 4);
    tracker.start("done", 4);
    tracker.error("failed", "boom");
    tracker.complete("done", 4);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(tracker.get("done").is_none());
    assert!(tracker.get("failed").is_some());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(tracker.get("failed").is_none());
}

#[tokio::test]
async fn test_start_afterComplete_shouldClearPendingExpiry() {
    let tracker = short_lived_tracker();
    tracker.start("file", 4);
    tracker.complete("file", 4);
    tracker.start("file", 4);

    tokio::time::sleep(Duration::from_millis(120)).await;

    let state = tracker.get("file").unwrap();
    assert_eq!(state.stage, Stage::Starting);
}

#[tokio::test]
async fn test_tracker_withConcurrentReaders_shouldNeverSeeTornState() {
    let tracker = ProgressTracker::default();
    tracker.start("file", 1000);

    let writer = {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            for current in 1..=1000 {
                tracker.update("file", Stage::LookingUp, current, &format!("word {}", current));
            }
        })
    };

    let reader = {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            for _ in 0..1000 {
                if let Some(state) = tracker.get("file") {
                    if state.stage == Stage::LookingUp {
                        assert_eq!(state.message, format!("word {}", state.current_word));
                    }
                }
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}
