use super::entity::{EntityId, LogLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug)]
pub enum MatchError {
    InvalidPattern(regex::Error),
    MalformedData(String),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::InvalidPattern(e) => write!(f, "Invalid pattern: {}", e),
            MatchError::MalformedData(msg) => write!(f, "Malformed data: {}", msg),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<regex::Error> for MatchError {
    fn from(e: regex::Error) -> Self {
        MatchError::InvalidPattern(e)
    }
}

pub type MatchResult<T> = std::result::Result<T, MatchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchScope {
    Url,
    QueryItems,
    RequestHeaders,
    RequestBody,
    ResponseHeaders,
    ResponseBody,
    Message,
    Metadata,
}

impl SearchScope {
    pub const ALL: [SearchScope; 8] = [
        SearchScope::Url,
        SearchScope::QueryItems,
        SearchScope::RequestHeaders,
        SearchScope::RequestBody,
        SearchScope::ResponseHeaders,
        SearchScope::ResponseBody,
        SearchScope::Message,
        SearchScope::Metadata,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SearchScope::Url => "URL",
            SearchScope::QueryItems => "Query Items",
            SearchScope::RequestHeaders => "Request Headers",
            SearchScope::RequestBody => "Request Body",
            SearchScope::ResponseHeaders => "Response Headers",
            SearchScope::ResponseBody => "Response Body",
            SearchScope::Message => "Message",
            SearchScope::Metadata => "Metadata",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusRange {
    pub start: u16,
    pub end: u16,
}

impl StatusRange {
    pub fn exact(code: u16) -> Self {
        Self {
            start: code,
            end: code,
        }
    }

    pub fn contains(&self, code: u16) -> bool {
        (self.start..=self.end).contains(&code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "kebab-case")]
pub enum SearchFilter {
    StatusCode {
        ranges: Vec<StatusRange>,
        #[serde(default)]
        negated: bool,
    },
    Host {
        values: Vec<String>,
        #[serde(default)]
        negated: bool,
    },
    Method {
        values: Vec<String>,
        #[serde(default)]
        negated: bool,
    },
    Path {
        values: Vec<String>,
        #[serde(default)]
        negated: bool,
    },
    Level {
        values: Vec<LogLevel>,
        #[serde(default)]
        negated: bool,
    },
    Label {
        values: Vec<String>,
        #[serde(default)]
        negated: bool,
    },
}

impl SearchFilter {
    pub fn host(value: impl Into<String>) -> Self {
        SearchFilter::Host {
            values: vec![value.into()],
            negated: false,
        }
    }

    pub fn status(range: StatusRange) -> Self {
        SearchFilter::StatusCode {
            ranges: vec![range],
            negated: false,
        }
    }

    pub fn method(value: impl Into<String>) -> Self {
        SearchFilter::Method {
            values: vec![value.into()],
            negated: false,
        }
    }

    pub fn level(level: LogLevel) -> Self {
        SearchFilter::Level {
            values: vec![level],
            negated: false,
        }
    }

    /// Human readable chip text, e.g. `host: api.example.com`.
    pub fn title(&self) -> String {
        let (key, values, negated) = match self {
            SearchFilter::StatusCode { ranges, negated } => (
                "status",
                ranges
                    .iter()
                    .map(|r| {
                        if r.start == r.end {
                            r.start.to_string()
                        } else {
                            format!("{}-{}", r.start, r.end)
                        }
                    })
                    .collect::<Vec<_>>(),
                *negated,
            ),
            SearchFilter::Host { values, negated } => ("host", values.clone(), *negated),
            SearchFilter::Method { values, negated } => ("method", values.clone(), *negated),
            SearchFilter::Path { values, negated } => ("path", values.clone(), *negated),
            SearchFilter::Level { values, negated } => (
                "level",
                values.iter().map(|l| l.name().to_string()).collect(),
                *negated,
            ),
            SearchFilter::Label { values, negated } => ("label", values.clone(), *negated),
        };
        let not = if negated { "not " } else { "" };
        format!("{}: {}{}", key, not, values.join(", "))
    }
}

/// One refinement chip added to the search bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SearchToken {
    Filter(SearchFilter),
    Scope(SearchScope),
    Text(String),
}

impl SearchToken {
    pub fn title(&self) -> String {
        match self {
            SearchToken::Filter(filter) => filter.title(),
            SearchToken::Scope(scope) => scope.title().to_string(),
            SearchToken::Text(text) => format!("\"{}\"", text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchKind {
    #[default]
    Substring,
    WholeWord,
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchRule {
    Contains,
    BeginsWith,
    EndsWith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MatchOptions {
    #[serde(default)]
    pub kind: SearchKind,
    #[serde(default)]
    pub case_sensitivity: CaseSensitivity,
    /// Only honoured by substring and whole-word kinds.
    #[serde(default)]
    pub rule: Option<MatchRule>,
}

impl MatchOptions {
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitivity == CaseSensitivity::Sensitive
    }
}

/// Immutable criteria derived from the search bar text and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchParameters {
    pub filters: Vec<SearchFilter>,
    pub scopes: BTreeSet<SearchScope>,
    pub search_terms: Vec<String>,
    pub options: MatchOptions,
}

impl SearchParameters {
    pub fn new(search_term: &str, tokens: &[SearchToken], options: MatchOptions) -> Self {
        let mut filters = Vec::new();
        let mut scopes = BTreeSet::new();
        let mut search_terms = Vec::new();

        let search_term = search_term.trim();
        if !search_term.is_empty() {
            search_terms.push(search_term.to_string());
        }
        for token in tokens {
            match token {
                SearchToken::Filter(filter) => filters.push(filter.clone()),
                SearchToken::Scope(scope) => {
                    scopes.insert(*scope);
                }
                SearchToken::Text(text) => {
                    if !text.trim().is_empty() {
                        search_terms.push(text.clone());
                    }
                }
            }
        }
        if scopes.is_empty() {
            scopes.extend(SearchScope::ALL);
        }

        Self {
            filters,
            scopes,
            search_terms,
            options,
        }
    }

    pub fn empty(options: MatchOptions) -> Self {
        Self::new("", &[], options)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.search_terms.is_empty()
    }
}

/// Where a term matched inside an entity; used for highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub scope: SearchScope,
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub entity_id: EntityId,
    pub occurrences: Vec<Occurrence>,
}

impl SearchResult {
    pub fn new(entity_id: EntityId, occurrences: Vec<Occurrence>) -> Self {
        Self {
            entity_id,
            occurrences,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchRole {
    Primary,
    Shadow,
}

impl SearchRole {
    pub fn name(self) -> &'static str {
        match self {
            SearchRole::Primary => "primary",
            SearchRole::Shadow => "shadow",
        }
    }
}

/// Worker → interactive context notifications for one operation.
#[derive(Debug, Clone)]
pub enum SearchMessage {
    ResultsAdded {
        search_id: u64,
        results: Vec<SearchResult>,
    },
    /// Always the last message of a page.
    Finished { search_id: u64, has_more: bool },
}

impl SearchMessage {
    pub fn search_id(&self) -> u64 {
        match self {
            SearchMessage::ResultsAdded { search_id, .. }
            | SearchMessage::Finished { search_id, .. } => *search_id,
        }
    }
}

/// Decides whether one entity satisfies the criteria.
pub trait MatchService: Send + Sync {
    /// `Ok(None)` means no match; errors are treated as no match by callers.
    fn matches(
        &self,
        entity: &super::entity::Entity,
        parameters: &SearchParameters,
    ) -> MatchResult<Option<Vec<Occurrence>>>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/search.rs"]
mod tests;
