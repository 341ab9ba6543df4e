use super::search::SearchToken;
use compact_str::{format_compact, CompactString};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionAction {
    Apply(SearchToken),
    Autocomplete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: CompactString,
    pub title: CompactString,
    pub subtitle: Option<CompactString>,
    pub action: SuggestionAction,
}

impl Suggestion {
    pub fn apply(token: SearchToken) -> Self {
        let title = CompactString::from(token.title());
        Self {
            id: format_compact!("apply:{}", title),
            title,
            subtitle: None,
            action: SuggestionAction::Apply(token),
        }
    }

    pub fn autocomplete(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: format_compact!("autocomplete:{}", text),
            title: CompactString::from(text.as_str()),
            subtitle: None,
            action: SuggestionAction::Autocomplete(text),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<CompactString>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn is_token(&self) -> bool {
        matches!(self.action, SuggestionAction::Apply(_))
    }

    pub fn token(&self) -> Option<&SearchToken> {
        match &self.action {
            SuggestionAction::Apply(token) => Some(token),
            SuggestionAction::Autocomplete(_) => None,
        }
    }
}

/// Input for one suggestion refresh; replies carry `generation` back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub generation: u64,
    pub search_text: String,
    pub tokens: Vec<SearchToken>,
    /// Selects default suggestions instead of contextual completions.
    pub criteria_empty: bool,
}

/// Fire-and-forget persistence of tokens the user applied.
pub trait RecentTokenStore: Send + Sync {
    /// Most recent first.
    fn recent_tokens(&self) -> Vec<SearchToken>;

    fn save_recent_token(&self, token: SearchToken);
}
