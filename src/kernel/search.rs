//! Search orchestrator state.
//!
//! Owns the applied criteria, the displayed results and at most one
//! primary and one shadow operation. Operations are tracked by the id the
//! bridge reports in `SearchStarted`; messages carrying any other id are
//! stale and ignored. The primary stays tracked after a page finishes so
//! `load_more` can resume it.

use crate::kernel::search_bar::SearchBarState;
use crate::kernel::services::ports::{
    EntityId, EntitySnapshot, MatchOptions, SearchConfig, SearchParameters, SearchResult,
    SearchRole, SearchToken, Suggestion, SuggestionAction, SuggestionRequest,
};
use crate::kernel::Effect;
use rustc_hash::FxHashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackedOperation {
    /// `None` until `SearchStarted` arrives.
    search_id: Option<u64>,
    running: bool,
}

impl TrackedOperation {
    fn pending() -> Self {
        Self {
            search_id: None,
            running: true,
        }
    }

    fn is(&self, search_id: u64) -> bool {
        self.search_id == Some(search_id)
    }
}

/// Last observed criteria; a change restarts the primary search.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Criteria {
    text: String,
    tokens: Vec<SearchToken>,
    options: MatchOptions,
}

/// Owned copy of everything the render layer observes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    pub text: String,
    pub tokens: Vec<SearchToken>,
    pub results: Vec<SearchResult>,
    pub is_searching: bool,
    pub has_more: bool,
    pub is_new_results_available: bool,
    pub top_suggestions: Vec<Suggestion>,
    pub suggested_scopes: Vec<Suggestion>,
    pub toolbar_title: String,
}

#[derive(Debug)]
pub struct SearchState {
    bar: SearchBarState,
    options: MatchOptions,
    criteria: Option<Criteria>,
    parameters: SearchParameters,
    candidates: EntitySnapshot,

    results: Vec<SearchResult>,
    result_ids: FxHashSet<EntityId>,
    buffer: Vec<SearchResult>,
    buffer_ids: FxHashSet<EntityId>,
    dirty_since: Option<Instant>,
    dirty_flush: Duration,

    is_searching: bool,
    has_more: bool,
    is_new_results_available: bool,
    is_visible: bool,
    interrupted: bool,

    primary: Option<TrackedOperation>,
    shadow: Option<TrackedOperation>,

    top_suggestions: Vec<Suggestion>,
    suggested_scopes: Vec<Suggestion>,
    suggestion_generation: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl SearchState {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            bar: SearchBarState::default(),
            options: config.default_options,
            criteria: None,
            parameters: SearchParameters::empty(config.default_options),
            candidates: EntitySnapshot::from(Vec::new()),
            results: Vec::new(),
            result_ids: FxHashSet::default(),
            buffer: Vec::new(),
            buffer_ids: FxHashSet::default(),
            dirty_since: None,
            dirty_flush: config.dirty_flush,
            is_searching: false,
            has_more: false,
            is_new_results_available: false,
            is_visible: false,
            interrupted: false,
            primary: None,
            shadow: None,
            top_suggestions: Vec::new(),
            suggested_scopes: Vec::new(),
            suggestion_generation: 0,
        }
    }

    pub fn bar(&self) -> &SearchBarState {
        &self.bar
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    pub fn parameters(&self) -> &SearchParameters {
        &self.parameters
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_new_results_available(&self) -> bool {
        self.is_new_results_available
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn top_suggestions(&self) -> &[Suggestion] {
        &self.top_suggestions
    }

    pub fn suggested_scopes(&self) -> &[Suggestion] {
        &self.suggested_scopes
    }

    pub fn suggestion_generation(&self) -> u64 {
        self.suggestion_generation
    }

    pub fn primary_search_id(&self) -> Option<u64> {
        self.primary.and_then(|op| op.search_id)
    }

    pub fn shadow_search_id(&self) -> Option<u64> {
        self.shadow.and_then(|op| op.search_id)
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow.is_some()
    }

    pub fn toolbar_title(&self) -> String {
        if self.parameters.is_empty() {
            "Suggested Filters".to_string()
        } else {
            format!("{} results", self.results.len())
        }
    }

    pub fn view(&self) -> SearchView {
        SearchView {
            text: self.bar.text.clone(),
            tokens: self.bar.tokens.clone(),
            results: self.results.clone(),
            is_searching: self.is_searching,
            has_more: self.has_more,
            is_new_results_available: self.is_new_results_available,
            top_suggestions: self.top_suggestions.clone(),
            suggested_scopes: self.suggested_scopes.clone(),
            toolbar_title: self.toolbar_title(),
        }
    }

    pub fn submit(
        &mut self,
        text: String,
        tokens: Vec<SearchToken>,
        now: Instant,
    ) -> (bool, Vec<Effect>) {
        let bar_changed = self.bar.replace(text, tokens);
        let (changed, effects) = self.update_criteria(now, false);
        (bar_changed || changed, effects)
    }

    pub fn set_text(&mut self, text: String, now: Instant) -> (bool, Vec<Effect>) {
        let bar_changed = self.bar.set_text(text);
        let (changed, effects) = self.update_criteria(now, false);
        (bar_changed || changed, effects)
    }

    pub fn remove_token(&mut self, index: usize, now: Instant) -> (bool, Vec<Effect>) {
        if !self.bar.remove_token(index) {
            return (false, Vec::new());
        }
        let (_, effects) = self.update_criteria(now, false);
        (true, effects)
    }

    pub fn set_options(&mut self, options: MatchOptions, now: Instant) -> (bool, Vec<Effect>) {
        if self.options == options {
            return (false, Vec::new());
        }
        self.options = options;
        self.update_criteria(now, false)
    }

    pub fn apply_suggestion(&mut self, suggestion: Suggestion, now: Instant) -> (bool, Vec<Effect>) {
        let mut effects = Vec::new();
        let bar_changed = match suggestion.action {
            SuggestionAction::Apply(token) => {
                effects.push(Effect::SaveRecentToken(token.clone()));
                self.bar.apply_token(token)
            }
            SuggestionAction::Autocomplete(text) => self.bar.set_text(text),
        };
        let (changed, more) = self.update_criteria(now, true);
        effects.extend(more);
        (bar_changed || changed, effects)
    }

    /// Applies the top suggestion when it is a token suggestion.
    pub fn submit_top_suggestion(&mut self, now: Instant) -> (bool, Vec<Effect>) {
        match self.top_suggestions.first() {
            Some(top) if top.is_token() => {
                let top = top.clone();
                self.apply_suggestion(top, now)
            }
            _ => (false, Vec::new()),
        }
    }

    pub fn load_more(&mut self) -> (bool, Vec<Effect>) {
        if !self.has_more || self.is_searching {
            return (false, Vec::new());
        }
        let Some(op) = self.primary.as_mut() else {
            return (false, Vec::new());
        };
        let Some(search_id) = op.search_id else {
            return (false, Vec::new());
        };
        op.running = true;
        self.is_searching = true;
        (true, vec![Effect::ResumeSearch { search_id }])
    }

    /// Full restart with the applied criteria.
    pub fn accept_new_results(&mut self, now: Instant) -> (bool, Vec<Effect>) {
        let mut effects = Vec::new();
        self.is_new_results_available = false;
        let parameters = self.parameters.clone();
        self.start_search(parameters, now, &mut effects);
        (true, effects)
    }

    pub fn set_visible(&mut self, visible: bool, now: Instant) -> (bool, Vec<Effect>) {
        if self.is_visible == visible {
            return (false, Vec::new());
        }
        self.is_visible = visible;
        let mut effects = Vec::new();

        if !visible {
            // A paused primary keeps its handle so paging continues on show.
            if self.is_searching {
                if self.primary.take().is_some() {
                    effects.push(Effect::CancelSearch {
                        role: SearchRole::Primary,
                    });
                }
                self.interrupted = true;
                self.is_searching = false;
                self.has_more = false;
                self.clear_buffer();
            }
            if self.shadow.take().is_some() {
                effects.push(Effect::CancelSearch {
                    role: SearchRole::Shadow,
                });
            }
        } else if std::mem::take(&mut self.interrupted) {
            let parameters = self.parameters.clone();
            self.start_search(parameters, now, &mut effects);
        }
        (true, effects)
    }

    pub fn set_candidates(&mut self, candidates: EntitySnapshot) -> bool {
        self.candidates = candidates;
        false
    }

    /// Starts a shadow probe over `snapshot` unless one would be redundant.
    pub fn entities_reloaded(&mut self, snapshot: EntitySnapshot) -> (bool, Vec<Effect>) {
        self.candidates = snapshot.clone();

        if !self.is_visible || self.parameters.is_empty() {
            return (false, Vec::new());
        }
        let primary_running = self.primary.is_some_and(|op| op.running);
        if primary_running || self.shadow.is_some() || self.is_new_results_available {
            return (false, Vec::new());
        }

        self.shadow = Some(TrackedOperation::pending());
        (
            false,
            vec![Effect::StartSearch {
                role: SearchRole::Shadow,
                candidates: snapshot,
                parameters: self.parameters.clone(),
            }],
        )
    }

    pub fn search_started(&mut self, role: SearchRole, search_id: u64) -> bool {
        let slot = match role {
            SearchRole::Primary => self.primary.as_mut(),
            SearchRole::Shadow => self.shadow.as_mut(),
        };
        match slot {
            Some(op) if op.search_id.is_none() => {
                op.search_id = Some(search_id);
            }
            _ => {
                tracing::warn!(role = role.name(), search_id, "untracked search started");
            }
        }
        false
    }

    pub fn results_added(
        &mut self,
        search_id: u64,
        results: Vec<SearchResult>,
        now: Instant,
    ) -> (bool, Vec<Effect>) {
        if self.primary.is_some_and(|op| op.is(search_id)) {
            let Some(since) = self.dirty_since else {
                return (self.append_results(results), Vec::new());
            };
            self.append_buffer(results);
            if now.saturating_duration_since(since) > self.dirty_flush {
                self.flush_buffer();
                return (true, Vec::new());
            }
            return (false, Vec::new());
        }

        if self.shadow.is_some_and(|op| op.is(search_id)) {
            self.shadow = None;
            let first = results.first().map(|r| r.entity_id);
            let current = self.results.first().map(|r| r.entity_id);
            let changed = first != current && !self.is_new_results_available;
            if first != current {
                tracing::debug!(search_id, "new search matches available");
                self.is_new_results_available = true;
            }
            return (
                changed,
                vec![Effect::CancelSearch {
                    role: SearchRole::Shadow,
                }],
            );
        }

        tracing::trace!(search_id, "ignoring stale search results");
        (false, Vec::new())
    }

    pub fn search_finished(&mut self, search_id: u64, has_more: bool) -> bool {
        if let Some(op) = self.primary.as_mut().filter(|op| op.is(search_id)) {
            op.running = false;
            self.is_searching = false;
            if self.dirty_since.is_some() {
                self.flush_buffer();
            }
            self.has_more = has_more;
            tracing::debug!(search_id, results = self.results.len(), has_more, "search finished");
            return true;
        }

        if self.shadow.is_some_and(|op| op.is(search_id)) {
            self.shadow = None;
        }
        false
    }

    pub fn suggestions_updated(
        &mut self,
        generation: u64,
        top: Vec<Suggestion>,
        scopes: Vec<Suggestion>,
    ) -> bool {
        if generation != self.suggestion_generation {
            return false;
        }
        let changed = self.top_suggestions != top || self.suggested_scopes != scopes;
        self.top_suggestions = top;
        self.suggested_scopes = scopes;
        changed
    }

    fn update_criteria(&mut self, now: Instant, force_suggestions: bool) -> (bool, Vec<Effect>) {
        let criteria = Criteria {
            text: self.bar.text.trim().to_string(),
            tokens: self.bar.tokens.clone(),
            options: self.options,
        };
        let mut effects = Vec::new();

        let previous = self.criteria.replace(criteria.clone());
        if previous.as_ref() == Some(&criteria) {
            if force_suggestions {
                effects.push(self.request_suggestions());
            }
            return (false, effects);
        }

        self.is_new_results_available = false;
        let parameters = self.bar.parameters(self.options);
        self.start_search(parameters, now, &mut effects);

        let bar_changed = previous
            .as_ref()
            .map_or(true, |p| p.text != criteria.text || p.tokens != criteria.tokens);
        if bar_changed || force_suggestions {
            effects.push(self.request_suggestions());
        }
        (true, effects)
    }

    fn start_search(&mut self, parameters: SearchParameters, now: Instant, effects: &mut Vec<Effect>) {
        if self.primary.take().is_some() {
            effects.push(Effect::CancelSearch {
                role: SearchRole::Primary,
            });
        }
        if self.shadow.take().is_some() {
            effects.push(Effect::CancelSearch {
                role: SearchRole::Shadow,
            });
        }
        self.interrupted = false;
        self.parameters = parameters;
        self.has_more = false;
        self.clear_buffer();

        if self.parameters.is_empty() {
            self.is_searching = false;
            self.results.clear();
            self.result_ids.clear();
            return;
        }

        if !self.results.is_empty() {
            self.dirty_since = Some(now);
        }
        self.is_searching = true;
        self.primary = Some(TrackedOperation::pending());
        effects.push(Effect::StartSearch {
            role: SearchRole::Primary,
            candidates: self.candidates.clone(),
            parameters: self.parameters.clone(),
        });
    }

    fn request_suggestions(&mut self) -> Effect {
        self.suggestion_generation += 1;
        Effect::RefreshSuggestions(SuggestionRequest {
            generation: self.suggestion_generation,
            search_text: self.bar.text.trim().to_string(),
            tokens: self.bar.tokens.clone(),
            criteria_empty: self.parameters.is_empty(),
        })
    }

    fn append_results(&mut self, results: Vec<SearchResult>) -> bool {
        let before = self.results.len();
        for result in results {
            if self.result_ids.insert(result.entity_id) {
                self.results.push(result);
            }
        }
        self.results.len() != before
    }

    fn append_buffer(&mut self, results: Vec<SearchResult>) {
        for result in results {
            if self.buffer_ids.insert(result.entity_id) {
                self.buffer.push(result);
            }
        }
    }

    fn flush_buffer(&mut self) {
        self.dirty_since = None;
        self.results = std::mem::take(&mut self.buffer);
        self.result_ids = std::mem::take(&mut self.buffer_ids);
    }

    fn clear_buffer(&mut self) {
        self.dirty_since = None;
        self.buffer.clear();
        self.buffer_ids.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/search.rs"]
mod tests;
