use crate::kernel::services::ports::{
    EntitySnapshot, SearchParameters, SearchRole, SearchToken, SuggestionRequest,
};

#[derive(Debug, Clone)]
pub enum Effect {
    /// Cancel whatever runs in `role`, then start a new operation and report
    /// its id back with `Action::SearchStarted`.
    StartSearch {
        role: SearchRole,
        candidates: EntitySnapshot,
        parameters: SearchParameters,
    },
    ResumeSearch {
        search_id: u64,
    },
    CancelSearch {
        role: SearchRole,
    },
    RefreshSuggestions(SuggestionRequest),
    SaveRecentToken(SearchToken),
}
