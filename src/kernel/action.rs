use crate::kernel::services::ports::{
    EntitySnapshot, MatchOptions, SearchMessage, SearchRole, SearchToken, Suggestion,
};

#[derive(Debug, Clone)]
pub enum Action {
    /// Replaces both the search text and the applied tokens.
    SearchSubmit {
        text: String,
        tokens: Vec<SearchToken>,
    },
    SearchSetText(String),
    SearchRemoveToken(usize),
    SearchSetOptions(MatchOptions),
    SearchLoadMore,
    SearchAcceptNewResults,
    SearchApplySuggestion(Suggestion),
    SearchSubmitTopSuggestion,
    SearchSetVisible(bool),
    /// Every entity snapshot; only updates the candidates for the next search.
    EntitiesChanged(EntitySnapshot),
    /// Throttled entity snapshot; may probe for new matches.
    EntitiesReloaded(EntitySnapshot),
    SearchStarted {
        role: SearchRole,
        search_id: u64,
    },
    SearchMessage(SearchMessage),
    SuggestionsUpdated {
        generation: u64,
        top: Vec<Suggestion>,
        scopes: Vec<Suggestion>,
    },
}
