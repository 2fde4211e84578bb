/*!
 * Tests for the tiered dictionary cache and the lookup queue
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;

use subvocab::dictionary::remote::parse_meaning;
use subvocab::dictionary::{
    DictionaryCache, FixedDelay, LookupEvent, LookupQueue, MeaningService, MeaningStore, SessionCache,
};

use crate::common::mocks::{MemoryMeaningStore, MockMeaningService};

fn cache_with(remote: Arc<MockMeaningService>, store: Option<Arc<MemoryMeaningStore>>) -> DictionaryCache {
    let remote: Arc<dyn MeaningService> = remote;
    let store: Option<Arc<dyn MeaningStore>> = store.map(|s| s as Arc<dyn MeaningStore>);
    DictionaryCache::new(SessionCache::new(), store, remote)
}

#[tokio::test]
async fn test_lookup_withRemoteHit_shouldFillBothCacheTiers() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let store = Arc::new(MemoryMeaningStore::new());
    let cache = cache_with(remote.clone(), Some(store.clone()));

    assert_eq!(cache.lookup("猫").await, Some("cat".to_string()));
    assert_eq!(store.get("猫"), Some("cat".to_string()));
    assert_eq!(cache.session().get("猫"), Some("cat".to_string()));

    // second lookup is served by the session tier
    assert_eq!(cache.lookup("猫").await, Some("cat".to_string()));
    assert_eq!(remote.call_count(), 1);
}

#[tokio::test]
async fn test_lookup_withPersistentHit_shouldSkipRemote() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let store = Arc::new(MemoryMeaningStore::with_entry("猫", "stored cat"));
    let cache = cache_with(remote.clone(), Some(store));

    assert_eq!(cache.lookup("猫").await, Some("stored cat".to_string()));
    assert_eq!(remote.call_count(), 0);
    assert_eq!(cache.session().get("猫"), Some("stored cat".to_string()));
}

#[tokio::test]
async fn test_lookup_withRemoteFailure_shouldReturnNoneAndCacheNothing() {
    let remote = Arc::new(MockMeaningService::failing());
    let store = Arc::new(MemoryMeaningStore::new());
    let cache = cache_with(remote.clone(), Some(store.clone()));

    assert_eq!(cache.lookup("猫").await, None);
    assert_eq!(store.get("猫"), None);
    assert!(cache.session().is_empty());
}

#[tokio::test]
async fn test_lookup_withUnknownWord_shouldNotRetryWithinLookup() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let cache = cache_with(remote.clone(), None);

    assert_eq!(cache.lookup("存在しない").await, None);
    assert_eq!(remote.call_count(), 1);
}

#[tokio::test]
async fn test_lookupBatch_shouldReturnOnlyFoundMeanings() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let cache = cache_with(remote.clone(), None);
    let words = vec!["猫".to_string(), "存在しない".to_string(), "先生".to_string()];

    let results = cache.lookup_batch(&words).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results["先生"], "teacher, master, doctor");
    assert_eq!(remote.requested(), words);
}

#[tokio::test]
async fn test_sessionStats_shouldCountHitsAndMisses() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let cache = cache_with(remote, None);

    cache.lookup("猫").await;
    cache.lookup("猫").await;
    cache.lookup("猫").await;

    let stats = cache.session_stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_lookupQueue_shouldResolveInOrderWithEvents() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let cache = Arc::new(cache_with(remote.clone(), None));
    let words = vec!["勉強".to_string(), "犬".to_string(), "猫".to_string()];

    let mut queue = LookupQueue::spawn(cache, words.clone(), Box::new(FixedDelay::new(Duration::ZERO)));
    let events: Vec<LookupEvent> = queue.events().collect().await;

    assert_eq!(events.len(), 6);
    assert!(matches!(&events[0], LookupEvent::Started { index: 0, word } if word == "勉強"));
    match &events[3] {
        LookupEvent::Finished(outcome) => {
            assert_eq!(outcome.index, 1);
            assert_eq!(outcome.meaning, None);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(remote.requested(), words);
}

#[tokio::test]
async fn test_lookupQueue_shouldDelayBetweenLookupsButNotAfterLast() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let cache = Arc::new(cache_with(remote, None));
    let words = vec!["猫".to_string(), "先生".to_string(), "勉強".to_string()];

    let start = Instant::now();
    let mut queue = LookupQueue::spawn(cache, words, Box::new(FixedDelay::new(Duration::from_millis(100))));
    let mut finished = 0;
    while let Some(event) = queue.next().await {
        if matches!(event, LookupEvent::Finished(_)) {
            finished += 1;
        }
    }
    let elapsed = start.elapsed();

    assert_eq!(finished, 3);
    // two waits between three lookups
    assert!(elapsed >= Duration::from_millis(200), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(290), "elapsed {:?}", elapsed);
}

#[test]
fn test_parseMeaning_shouldJoinFirstThreeDefinitions() {
    let body = r#"{"data":[{"senses":[{"english_definitions":["study","diligence","working hard","extra"]}]}]}"#;
    assert_eq!(parse_meaning(body).unwrap(), Some("study, diligence, working hard".to_string()));
}

#[test]
fn test_lookup_fromBlockingContext_shouldResolve() {
    let remote = Arc::new(MockMeaningService::with_sample_meanings());
    let cache = cache_with(remote, None);

    let meaning = tokio_test::block_on(cache.lookup("勉強"));
    assert_eq!(meaning, Some("study".to_string()));
}

#[test]
fn test_parseMeaning_withNoSenses_shouldReturnNone() {
    assert_eq!(parse_meaning(r#"{"data":[]}"#).unwrap(), None);
    assert_eq!(parse_meaning(r#"{"data":[{"senses":[]}]}"#).unwrap(), None);
    assert!(parse_meaning("not json").is_err());
}
