//! Service ports: traits + data contracts.

pub mod config;
pub mod entity;
pub mod search;
pub mod settings;
pub mod suggestion;

pub use config::SearchConfig;
pub use entity::{Entity, EntityId, EntitySnapshot, EntityStore, LogLevel, LogMessage, NetworkTask};
pub use search::{
    CaseSensitivity, MatchError, MatchOptions, MatchResult, MatchRule, MatchService, Occurrence,
    SearchFilter, SearchKind, SearchMessage, SearchParameters, SearchResult, SearchRole,
    SearchScope, SearchToken, StatusRange,
};
pub use settings::{SearchSettings, Settings};
pub use suggestion::{RecentTokenStore, Suggestion, SuggestionAction, SuggestionRequest};
