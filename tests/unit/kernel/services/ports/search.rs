use super::*;

fn text(value: &str) -> SearchToken {
    SearchToken::Text(value.to_string())
}

#[test]
fn test_empty_parameters() {
    let params = SearchParameters::new("", &[], MatchOptions::default());
    assert!(params.is_empty());
    assert!(params.search_terms.is_empty());
    assert_eq!(params.scopes.len(), SearchScope::ALL.len());

    let params = SearchParameters::new("   ", &[], MatchOptions::default());
    assert!(params.is_empty());
}

#[test]
fn test_text_tokens_become_terms_in_order() {
    let tokens = vec![text("alpha"), text(""), text("beta"), text("  "), text("gamma")];
    let params = SearchParameters::new("", &tokens, MatchOptions::default());
    assert_eq!(params.search_terms, vec!["alpha", "beta", "gamma"]);
    assert!(!params.is_empty());
}

#[test]
fn test_free_text_comes_first_and_is_trimmed() {
    let params = SearchParameters::new("  error ", &[text("timeout")], MatchOptions::default());
    assert_eq!(params.search_terms, vec!["error", "timeout"]);
}

#[test]
fn test_scope_tokens_replace_default_scopes() {
    let tokens = vec![
        SearchToken::Scope(SearchScope::ResponseBody),
        SearchToken::Scope(SearchScope::Url),
        SearchToken::Scope(SearchScope::Url),
    ];
    let params = SearchParameters::new("x", &tokens, MatchOptions::default());
    let scopes: Vec<_> = params.scopes.iter().copied().collect();
    assert_eq!(scopes, vec![SearchScope::Url, SearchScope::ResponseBody]);
}

#[test]
fn test_filters_only_is_not_empty() {
    let tokens = vec![SearchToken::Filter(SearchFilter::host("example.com"))];
    let params = SearchParameters::new("", &tokens, MatchOptions::default());
    assert!(!params.is_empty());
    assert_eq!(params.filters.len(), 1);
}

#[test]
fn test_structural_equality() {
    let tokens = vec![SearchToken::Filter(SearchFilter::status(StatusRange::exact(500)))];
    let a = SearchParameters::new("error", &tokens, MatchOptions::default());
    let b = SearchParameters::new("error ", &tokens, MatchOptions::default());
    assert_eq!(a, b);

    let sensitive = MatchOptions {
        case_sensitivity: CaseSensitivity::Sensitive,
        ..MatchOptions::default()
    };
    let c = SearchParameters::new("error", &tokens, sensitive);
    assert_ne!(a, c);
}

#[test]
fn test_filter_titles() {
    let filter = SearchFilter::StatusCode {
        ranges: vec![StatusRange { start: 500, end: 599 }],
        negated: true,
    };
    assert_eq!(filter.title(), "status: not 500-599");
    assert_eq!(SearchFilter::host("api.example.com").title(), "host: api.example.com");
}

#[test]
fn test_token_serde() {
    let token = SearchToken::Filter(SearchFilter::level(LogLevel::Error));
    let json = serde_json::to_string(&token).unwrap();
    let back: SearchToken = serde_json::from_str(&json).unwrap();
    assert_eq!(back, token);
}
