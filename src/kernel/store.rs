use super::{Action, Effect, SearchState};
use crate::kernel::services::ports::SearchMessage;
use std::time::Instant;

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

pub struct Store {
    state: SearchState,
}

impl Store {
    pub fn new(state: SearchState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        self.dispatch_at(action, Instant::now())
    }

    /// Same as `dispatch` with an explicit clock for the dirty-buffer window.
    pub fn dispatch_at(&mut self, action: Action, now: Instant) -> DispatchResult {
        let state = &mut self.state;
        let (state_changed, effects) = match action {
            Action::SearchSubmit { text, tokens } => state.submit(text, tokens, now),
            Action::SearchSetText(text) => state.set_text(text, now),
            Action::SearchRemoveToken(index) => state.remove_token(index, now),
            Action::SearchSetOptions(options) => state.set_options(options, now),
            Action::SearchLoadMore => state.load_more(),
            Action::SearchAcceptNewResults => state.accept_new_results(now),
            Action::SearchApplySuggestion(suggestion) => state.apply_suggestion(suggestion, now),
            Action::SearchSubmitTopSuggestion => state.submit_top_suggestion(now),
            Action::SearchSetVisible(visible) => state.set_visible(visible, now),
            Action::EntitiesChanged(snapshot) => (state.set_candidates(snapshot), Vec::new()),
            Action::EntitiesReloaded(snapshot) => state.entities_reloaded(snapshot),
            Action::SearchStarted { role, search_id } => {
                tracing::debug!(role = role.name(), search_id, "search started");
                (state.search_started(role, search_id), Vec::new())
            }
            Action::SearchMessage(SearchMessage::ResultsAdded { search_id, results }) => {
                state.results_added(search_id, results, now)
            }
            Action::SearchMessage(SearchMessage::Finished {
                search_id,
                has_more,
            }) => (state.search_finished(search_id, has_more), Vec::new()),
            Action::SuggestionsUpdated {
                generation,
                top,
                scopes,
            } => (state.suggestions_updated(generation, top, scopes), Vec::new()),
        };

        DispatchResult {
            effects,
            state_changed,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
