/*!
 * Integration tests for SQLite persistence on disk
 */

use subvocab::database::models::{AnswerRecord, QuizAttemptRecord, SubtitleFileRecord, VocabularyRecord};
use subvocab::database::{DatabaseConnection, Repository};

use crate::common;

fn open(path: &std::path::Path) -> Repository {
    Repository::new(DatabaseConnection::new(path).unwrap())
}

#[tokio::test]
async fn test_repository_afterReopen_shouldKeepFilesAndCache() {
    let temp_dir = common::create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("nested").join("subvocab.db");

    let file = SubtitleFileRecord::new("local", "episode01.srt", 512, "hash-1");
    {
        let repo = open(&db_path);
        repo.create_file(&file).await.unwrap();
        repo.insert_vocabulary(&[VocabularyRecord::new(&file.id, "猫", "ねこ", "cat", "猫。", 4)])
            .await
            .unwrap();
        repo.cache_meaning("猫", "cat").await.unwrap();
    }

    let repo = open(&db_path);
    assert_eq!(repo.get_file(&file.id).await.unwrap(), Some(file.clone()));
    assert_eq!(repo.vocabulary_count(&file.id).await.unwrap(), 1);
    assert_eq!(repo.get_cached_meaning("猫").await.unwrap(), Some("cat".to_string()));

    let stats = repo.connection().stats().await.unwrap();
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.vocabulary_count, 1);
    assert_eq!(stats.cache_count, 1);
}

#[tokio::test]
async fn test_insertVocabulary_withUnknownFile_shouldWriteNothing() {
    let repo = Repository::new_in_memory().unwrap();
    let file = SubtitleFileRecord::new("local", "a.srt", 1, "h");
    repo.create_file(&file).await.unwrap();

    let records = vec![
        VocabularyRecord::new(&file.id, "猫", "ねこ", "cat", "猫。", 2),
        VocabularyRecord::new("no-such-file", "犬", "いぬ", "dog", "犬。", 2),
    ];

    assert!(repo.insert_vocabulary(&records).await.is_err());
    assert_eq!(repo.vocabulary_count(&file.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_getVocabularyForFile_shouldOrderByFrequency() {
    let repo = Repository::new_in_memory().unwrap();
    let file = SubtitleFileRecord::new("local", "a.srt", 1, "h");
    repo.create_file(&file).await.unwrap();

    repo.insert_vocabulary(&[
        VocabularyRecord::new(&file.id, "犬", "いぬ", "dog", "犬。", 2),
        VocabularyRecord::new(&file.id, "猫", "ねこ", "cat", "猫。", 5),
        VocabularyRecord::new(&file.id, "鳥", "とり", "bird", "鳥。", 2),
    ])
    .await
    .unwrap();

    let words: Vec<String> = repo
        .get_vocabulary_for_file(&file.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.word)
        .collect();
    assert_eq!(words, vec!["猫", "犬", "鳥"]);
}

#[tokio::test]
async fn test_findFileByHash_shouldBeScopedToUser() {
    let repo = Repository::new_in_memory().unwrap();
    let file = SubtitleFileRecord::new("alice", "a.srt", 1, "same-hash");
    repo.create_file(&file).await.unwrap();

    assert!(repo.find_file_by_hash("alice", "same-hash").await.unwrap().is_some());
    assert!(repo.find_file_by_hash("bob", "same-hash").await.unwrap().is_none());
    assert_eq!(repo.list_files("alice").await.unwrap().len(), 1);
    assert!(repo.list_files("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recordQuizAttempt_twice_shouldAccumulateItemCounters() {
    let repo = Repository::new_in_memory().unwrap();
    let file = SubtitleFileRecord::new("local", "a.srt", 1, "h");
    repo.create_file(&file).await.unwrap();
    let cat = VocabularyRecord::new(&file.id, "猫", "ねこ", "cat", "猫。", 2);
    repo.insert_vocabulary(&[cat.clone()]).await.unwrap();

    let right = AnswerRecord { vocabulary_id: cat.id.clone(), is_correct: true };
    let wrong = AnswerRecord { vocabulary_id: cat.id.clone(), is_correct: false };

    repo.record_quiz_attempt(&QuizAttemptRecord::new("local", &file.id, 1, 1), &[right])
        .await
        .unwrap();
    repo.record_quiz_attempt(&QuizAttemptRecord::new("local", &file.id, 0, 1), &[wrong])
        .await
        .unwrap();

    let item = repo.get_quiz_item(&cat.id).await.unwrap().unwrap();
    assert_eq!(item.attempts, 2);
    assert_eq!(item.correct, 1);

    let stats = repo.dashboard_stats("local").await.unwrap();
    assert_eq!(stats.total_files, 1);
    assert_eq!(stats.total_words, 1);
    assert_eq!(stats.quizzes_taken, 2);
    assert_eq!(stats.average_accuracy, 50);
    assert_eq!(stats.recent_quizzes.len(), 2);
}

#[tokio::test]
async fn test_cacheStats_withEntries_shouldReportOldestFirst() {
    let repo = Repository::new_in_memory().unwrap();
    assert!(repo.cache_meaning("猫", "cat").await.unwrap());
    assert!(repo.cache_meaning("犬", "dog").await.unwrap());
    assert!(!repo.cache_meaning("猫", "kitty").await.unwrap());
    assert_eq!(repo.get_cached_meaning("猫").await.unwrap(), Some("cat".to_string()));

    let stats = repo.cache_stats().await.unwrap();
    assert_eq!(stats.total_entries, 2);
    assert_eq!(stats.oldest[0].word, "猫");
    assert_eq!(stats.recent[0].word, "犬");
    assert_eq!(stats.cache_age.as_deref(), Some(stats.oldest[0].created_at.as_str()));
}
