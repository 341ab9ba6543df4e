//! Search session: binds the kernel store to the worker runtime.
//!
//! Runs effects (holding the live operation handles), drains the kernel bus,
//! throttles entity snapshots and publishes `SearchView` snapshots to
//! observers after every visible change. All state mutation happens on the
//! thread that owns the session.

use crate::kernel::services::adapters::{
    AsyncRuntime, ConsoleSearchService, ConsoleSearchSuggestionsService, MemoryEntityStore,
    SearchOperationService, SearchTask,
};
use crate::kernel::services::ports::{
    EntitySnapshot, EntityStore, MatchOptions, MatchService, RecentTokenStore, SearchConfig,
    SearchRole, SearchToken, Suggestion,
};
use crate::kernel::services::{kernel_bus, KernelBusReceiver};
use crate::kernel::{Action, Effect, SearchState, SearchView, Store, Throttle};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

const MAX_KERNEL_BUS_DRAIN_PER_PUMP: usize = 256;
const WAIT_SLICE: Duration = Duration::from_millis(10);

pub struct SearchSession {
    store: Store,
    runtime: AsyncRuntime,
    operations: SearchOperationService,
    suggestions: Arc<ConsoleSearchSuggestionsService>,
    entities: Arc<dyn EntityStore>,
    snapshots: watch::Receiver<EntitySnapshot>,
    bus_rx: KernelBusReceiver,
    primary_task: Option<SearchTask>,
    shadow_task: Option<SearchTask>,
    refresh: Throttle<EntitySnapshot>,
    view_tx: watch::Sender<SearchView>,
}

impl SearchSession {
    pub fn new(
        entities: Arc<dyn EntityStore>,
        snapshots: watch::Receiver<EntitySnapshot>,
        recents: Arc<dyn RecentTokenStore>,
        config: SearchConfig,
    ) -> io::Result<Self> {
        let matcher: Arc<dyn MatchService> = Arc::new(ConsoleSearchService::default());
        Self::with_matcher(entities, snapshots, recents, matcher, config)
    }

    pub fn with_memory_store(
        store: Arc<MemoryEntityStore>,
        recents: Arc<dyn RecentTokenStore>,
        config: SearchConfig,
    ) -> io::Result<Self> {
        let snapshots = store.subscribe();
        Self::new(store, snapshots, recents, config)
    }

    pub fn with_matcher(
        entities: Arc<dyn EntityStore>,
        mut snapshots: watch::Receiver<EntitySnapshot>,
        recents: Arc<dyn RecentTokenStore>,
        matcher: Arc<dyn MatchService>,
        config: SearchConfig,
    ) -> io::Result<Self> {
        let (bus, bus_rx) = kernel_bus();
        let runtime = AsyncRuntime::new(config.worker_threads, bus.clone())?;
        let operations = SearchOperationService::new(
            runtime.tokio_handle(),
            Arc::clone(&entities),
            matcher,
            bus,
            &config,
        );
        let suggestions = Arc::new(ConsoleSearchSuggestionsService::new(
            recents,
            config.suggestion_limit,
        ));
        let store = Store::new(SearchState::new(&config));
        let (view_tx, _) = watch::channel(store.state().view());
        let initial = snapshots.borrow_and_update().clone();

        let mut session = Self {
            store,
            runtime,
            operations,
            suggestions,
            entities,
            snapshots,
            bus_rx,
            primary_task: None,
            shadow_task: None,
            refresh: Throttle::new(config.refresh_throttle),
            view_tx,
        };

        let now = Instant::now();
        let generation = session.store.state().suggestion_generation();
        let top = session.suggestions.default_top_suggestions(&[]);
        let scopes = session.suggestions.default_suggested_scopes();
        session.dispatch(
            Action::SuggestionsUpdated {
                generation,
                top,
                scopes,
            },
            now,
        );
        session.observe_snapshot(initial, now);
        session.publish();

        tracing::info!(
            entities = session.snapshots.borrow().len(),
            page_size = config.page_size,
            "search session ready"
        );
        Ok(session)
    }

    pub fn state(&self) -> &SearchState {
        self.store.state()
    }

    pub fn view(&self) -> SearchView {
        self.store.state().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view_tx.subscribe()
    }

    pub fn submit_criteria(&mut self, text: impl Into<String>, tokens: Vec<SearchToken>) -> bool {
        self.command(Action::SearchSubmit {
            text: text.into(),
            tokens,
        })
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        self.command(Action::SearchSetText(text.into()))
    }

    pub fn remove_token(&mut self, index: usize) -> bool {
        self.command(Action::SearchRemoveToken(index))
    }

    pub fn set_options(&mut self, options: MatchOptions) -> bool {
        self.command(Action::SearchSetOptions(options))
    }

    pub fn load_more_results(&mut self) -> bool {
        self.command(Action::SearchLoadMore)
    }

    pub fn accept_new_results(&mut self) -> bool {
        self.command(Action::SearchAcceptNewResults)
    }

    pub fn apply_suggestion(&mut self, suggestion: Suggestion) -> bool {
        self.command(Action::SearchApplySuggestion(suggestion))
    }

    pub fn submit_top_suggestion(&mut self) -> bool {
        self.command(Action::SearchSubmitTopSuggestion)
    }

    pub fn set_view_visible(&mut self, visible: bool) -> bool {
        self.command(Action::SearchSetVisible(visible))
    }

    /// Handles everything already queued without blocking.
    pub fn pump(&mut self) -> bool {
        let now = Instant::now();
        let mut changed = self.poll_entities(now);
        changed |= self.poll_kernel_bus();
        if changed {
            self.publish();
        }
        changed
    }

    /// Blocks until a worker message arrives, the refresh throttle reopens
    /// or `timeout` elapses, then pumps.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let now = Instant::now();
        let mut wake = now + timeout;
        if let Some(deadline) = self.refresh.next_deadline() {
            wake = wake.min(deadline);
        }

        let mut changed = false;
        if let Some(action) = self.bus_rx.next_timeout(wake.saturating_duration_since(now)) {
            changed = self.dispatch(action, Instant::now());
        }
        if changed {
            self.publish();
        }
        self.pump() || changed
    }

    /// Pumps until `done` holds for the state or `timeout` elapses.
    pub fn wait_until(&mut self, timeout: Duration, done: impl Fn(&SearchState) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if done(self.store.state()) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait((deadline - now).min(WAIT_SLICE));
        }
    }

    fn command(&mut self, action: Action) -> bool {
        let changed = self.dispatch(action, Instant::now());
        if changed {
            self.publish();
        }
        changed
    }

    fn dispatch(&mut self, action: Action, now: Instant) -> bool {
        let result = self.store.dispatch_at(action, now);
        for effect in result.effects {
            self.run_effect(effect, now);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: Effect, now: Instant) {
        match effect {
            Effect::StartSearch {
                role,
                candidates,
                parameters,
            } => {
                if let Some(task) = self.task_slot(role).take() {
                    task.cancel();
                }
                let task = self.operations.start(candidates, parameters);
                let search_id = task.id();
                *self.task_slot(role) = Some(task);
                let _ = self.dispatch(Action::SearchStarted { role, search_id }, now);
            }
            Effect::ResumeSearch { search_id } => match &self.primary_task {
                Some(task) if task.id() == search_id => {
                    if !task.resume() {
                        tracing::debug!(search_id, "search page already running");
                    }
                }
                _ => tracing::warn!(search_id, "resume requested for unknown search"),
            },
            Effect::CancelSearch { role } => {
                if let Some(task) = self.task_slot(role).take() {
                    task.cancel();
                }
            }
            Effect::RefreshSuggestions(request) => {
                self.runtime.refresh_suggestions(
                    Arc::clone(&self.suggestions),
                    Arc::clone(&self.entities),
                    request,
                );
            }
            Effect::SaveRecentToken(token) => {
                self.runtime
                    .save_recent_token(Arc::clone(&self.suggestions), token);
            }
        }
    }

    fn task_slot(&mut self, role: SearchRole) -> &mut Option<SearchTask> {
        match role {
            SearchRole::Primary => &mut self.primary_task,
            SearchRole::Shadow => &mut self.shadow_task,
        }
    }

    fn poll_entities(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if matches!(self.snapshots.has_changed(), Ok(true)) {
            let snapshot = self.snapshots.borrow_and_update().clone();
            changed |= self.observe_snapshot(snapshot, now);
        }
        if let Some(snapshot) = self.refresh.poll(now) {
            changed |= self.dispatch(Action::EntitiesReloaded(snapshot), now);
        }
        changed
    }

    fn observe_snapshot(&mut self, snapshot: EntitySnapshot, now: Instant) -> bool {
        let mut changed = self.dispatch(Action::EntitiesChanged(snapshot.clone()), now);
        if let Some(snapshot) = self.refresh.push(snapshot, now) {
            changed |= self.dispatch(Action::EntitiesReloaded(snapshot), now);
        }
        changed
    }

    fn poll_kernel_bus(&mut self) -> bool {
        let mut changed = false;
        for action in self.bus_rx.drain(MAX_KERNEL_BUS_DRAIN_PER_PUMP) {
            changed |= self.dispatch(action, Instant::now());
        }
        changed
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.store.state().view());
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        for task in [self.primary_task.take(), self.shadow_task.take()]
            .into_iter()
            .flatten()
        {
            task.cancel();
        }
    }
}
