use super::*;
use crate::kernel::services::ports::{SearchFilter, SearchScope};
use tempfile::tempdir;

fn host(value: &str) -> SearchToken {
    SearchToken::Filter(SearchFilter::host(value))
}

#[test]
fn test_most_recent_first_without_duplicates() {
    let store = MemoryRecentTokens::new(3);
    store.save_recent_token(host("a"));
    store.save_recent_token(host("b"));
    store.save_recent_token(host("a"));
    assert_eq!(store.recent_tokens(), vec![host("a"), host("b")]);
}

#[test]
fn test_limit() {
    let store = MemoryRecentTokens::new(2);
    store.save_recent_token(host("a"));
    store.save_recent_token(host("b"));
    store.save_recent_token(SearchToken::Scope(SearchScope::Url));
    assert_eq!(
        store.recent_tokens(),
        vec![SearchToken::Scope(SearchScope::Url), host("b")]
    );
}

#[test]
fn test_json_round_trip_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("recent.json");

    let store = JsonRecentTokens::open(&path, 20).unwrap();
    assert!(store.recent_tokens().is_empty());
    store.save_recent_token(host("api.example.com"));
    store.save_recent_token(SearchToken::Scope(SearchScope::ResponseBody));
    assert!(path.exists());

    let reopened = JsonRecentTokens::open(&path, 20).unwrap();
    assert_eq!(
        reopened.recent_tokens(),
        vec![
            SearchToken::Scope(SearchScope::ResponseBody),
            host("api.example.com")
        ]
    );
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("recent.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(
        JsonRecentTokens::open(&path, 20),
        Err(RecentTokensError::Json(_))
    ));
}
