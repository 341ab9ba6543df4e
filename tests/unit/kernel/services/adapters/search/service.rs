use super::*;
use crate::kernel::services::ports::{
    EntityId, LogLevel, MatchError, SearchKind, SearchToken, StatusRange,
};

fn message(id: u64, level: LogLevel, text: &str) -> Entity {
    Entity::Message(LogMessage {
        id: EntityId(id),
        level,
        label: "network".to_string(),
        text: text.to_string(),
        metadata: vec![("user".to_string(), "alice".to_string())],
    })
}

fn task(id: u64, url: &str, status: Option<u16>) -> Entity {
    Entity::Task(NetworkTask {
        id: EntityId(id),
        url: url.to_string(),
        method: "POST".to_string(),
        status_code: status,
        request_headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        response_headers: Vec::new(),
        request_body: Some(br#"{"name":"widget"}"#.to_vec()),
        response_body: None,
        error: None,
    })
}

fn params(text: &str, tokens: &[SearchToken]) -> SearchParameters {
    SearchParameters::new(text, tokens, MatchOptions::default())
}

#[test]
fn test_text_match_in_message() {
    let service = ConsoleSearchService::new();
    let entity = message(1, LogLevel::Error, "Request failed: timeout");
    let occurrences = service
        .matches(&entity, &params("timeout", &[]))
        .unwrap()
        .unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].scope, SearchScope::Message);
    assert_eq!(occurrences[0].start, 16);

    assert!(service
        .matches(&entity, &params("success", &[]))
        .unwrap()
        .is_none());
}

#[test]
fn test_terms_are_or_within_group() {
    let service = ConsoleSearchService::new();
    let entity = message(1, LogLevel::Info, "cache hit");
    let tokens = vec![SearchToken::Text("miss".to_string())];
    assert!(service.matches(&entity, &params("hit", &tokens)).unwrap().is_some());
    let tokens = vec![SearchToken::Text("evicted".to_string())];
    assert!(service.matches(&entity, &params("miss", &tokens)).unwrap().is_none());
}

#[test]
fn test_metadata_scope() {
    let service = ConsoleSearchService::new();
    let entity = message(1, LogLevel::Info, "login");
    let tokens = vec![SearchToken::Scope(SearchScope::Metadata)];
    let occurrences = service
        .matches(&entity, &params("alice", &tokens))
        .unwrap()
        .unwrap();
    assert_eq!(occurrences[0].scope, SearchScope::Metadata);
    assert_eq!(occurrences[0].preview, "user: alice");

    let tokens = vec![SearchToken::Scope(SearchScope::Url)];
    assert!(service.matches(&entity, &params("alice", &tokens)).unwrap().is_none());
}

#[test]
fn test_filters_are_conjunctive() {
    let service = ConsoleSearchService::new();
    let entity = task(1, "https://api.example.com/v1/users?page=2", Some(500));

    let server_error = SearchToken::Filter(SearchFilter::status(StatusRange {
        start: 500,
        end: 599,
    }));
    let host = SearchToken::Filter(SearchFilter::host("example.com"));
    let other_host = SearchToken::Filter(SearchFilter::host("other.org"));

    let found = service
        .matches(&entity, &params("", &[server_error.clone(), host]))
        .unwrap();
    assert_eq!(found, Some(Vec::new()));

    assert!(service
        .matches(&entity, &params("", &[server_error, other_host]))
        .unwrap()
        .is_none());
}

#[test]
fn test_negated_filter() {
    let service = ConsoleSearchService::new();
    let entity = task(1, "https://api.example.com/", Some(200));
    let not_ok = SearchToken::Filter(SearchFilter::StatusCode {
        ranges: vec![StatusRange::exact(200)],
        negated: true,
    });
    assert!(service.matches(&entity, &params("", &[not_ok])).unwrap().is_none());
}

#[test]
fn test_network_filter_never_matches_message() {
    let service = ConsoleSearchService::new();
    let entity = message(1, LogLevel::Error, "example.com");
    let host = SearchToken::Filter(SearchFilter::Host {
        values: vec!["nothing".to_string()],
        negated: true,
    });
    assert!(service.matches(&entity, &params("", &[host])).unwrap().is_none());

    let level = SearchToken::Filter(SearchFilter::level(LogLevel::Error));
    assert!(service.matches(&entity, &params("", &[level])).unwrap().is_some());
}

#[test]
fn test_task_scopes() {
    let service = ConsoleSearchService::new();
    let entity = task(1, "https://api.example.com/v1/users?page=2&sort=asc", Some(201));

    let query = service
        .matches(&entity, &params("sort", &[SearchToken::Scope(SearchScope::QueryItems)]))
        .unwrap()
        .unwrap();
    assert_eq!(query[0].line, 1);

    let body = service
        .matches(&entity, &params("widget", &[SearchToken::Scope(SearchScope::RequestBody)]))
        .unwrap()
        .unwrap();
    assert_eq!(body[0].scope, SearchScope::RequestBody);

    let headers = service
        .matches(&entity, &params("json", &[SearchToken::Scope(SearchScope::RequestHeaders)]))
        .unwrap();
    assert!(headers.is_some());
}

#[test]
fn test_latin1_body_does_not_hide_url_match() {
    let service = ConsoleSearchService::new();
    let mut entity = task(1, "https://api.example.com/error", Some(500));
    if let Entity::Task(task) = &mut entity {
        task.response_body = Some(vec![b'c', b'a', b'f', 0xE9]);
    }

    let occurrences = service
        .matches(&entity, &params("error", &[]))
        .unwrap()
        .unwrap();
    assert!(occurrences.iter().all(|o| o.scope == SearchScope::Url));
    assert!(!occurrences.is_empty());

    let body_only = [SearchToken::Scope(SearchScope::ResponseBody)];
    assert!(service
        .matches(&entity, &params("caf", &body_only))
        .unwrap()
        .is_none());
}

#[test]
fn test_binary_body_is_skipped() {
    let service = ConsoleSearchService::new();
    let mut entity = task(1, "https://api.example.com/", Some(200));
    if let Entity::Task(task) = &mut entity {
        task.response_body = Some(vec![b'a', 0, b'a']);
    }
    let result = service
        .matches(&entity, &params("a", &[SearchToken::Scope(SearchScope::ResponseBody)]))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_invalid_regex_reports_error() {
    let service = ConsoleSearchService::new();
    let entity = message(1, LogLevel::Info, "text");
    let options = MatchOptions {
        kind: SearchKind::Regex,
        ..MatchOptions::default()
    };
    let parameters = SearchParameters::new("[invalid", &[], options);
    assert!(matches!(
        service.matches(&entity, &parameters),
        Err(MatchError::InvalidPattern(_))
    ));
    // Cached failure is returned again without recompiling.
    assert!(service.matches(&entity, &parameters).is_err());
}
