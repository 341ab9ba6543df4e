//! Paged search operations
//!
//! One operation scans a fixed candidate snapshot newest-first, sending a
//! batch of results after every chunk, and pauses once a page is full.
//! `resume` continues from the saved cursor with the same identity.

use crate::kernel::services::bus::KernelBusSender;
use crate::kernel::services::ports::{
    EntityId, EntityStore, MatchService, SearchConfig, SearchMessage, SearchParameters,
    SearchResult,
};
use crate::kernel::Action;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

static SEARCH_ID: AtomicU64 = AtomicU64::new(1);

fn next_search_id() -> u64 {
    SEARCH_ID.fetch_add(1, Ordering::Relaxed)
}

struct OperationState {
    id: u64,
    candidates: Arc<[EntityId]>,
    parameters: SearchParameters,
    cursor: AtomicUsize,
    cancelled: AtomicBool,
    running: AtomicBool,
}

#[derive(Clone)]
struct OperationContext {
    runtime: tokio::runtime::Handle,
    store: Arc<dyn EntityStore>,
    matcher: Arc<dyn MatchService>,
    bus: KernelBusSender,
    page_size: usize,
    batch_size: usize,
}

pub struct SearchTask {
    state: Arc<OperationState>,
    ctx: OperationContext,
}

impl SearchTask {
    pub fn id(&self) -> u64 {
        self.state.id
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Candidates evaluated so far.
    pub fn scanned(&self) -> usize {
        self.state.cursor.load(Ordering::Acquire)
    }

    /// Scans the next page. No-op while a page is running or after cancel.
    pub fn resume(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        if self.state.running.swap(true, Ordering::AcqRel) {
            return false;
        }

        let state = Arc::clone(&self.state);
        let ctx = self.ctx.clone();
        self.ctx.runtime.spawn(async move {
            let state_for_blocking = Arc::clone(&state);
            let ctx_for_blocking = ctx.clone();
            let result =
                tokio::task::spawn_blocking(move || scan_page(&ctx_for_blocking, &state_for_blocking))
                    .await;

            let has_more = match result {
                Ok(has_more) => has_more,
                Err(e) => {
                    tracing::error!(search_id = state.id, error = %e, "search page failed");
                    false
                }
            };
            state.running.store(false, Ordering::Release);

            if state.cancelled.load(Ordering::Relaxed) {
                tracing::debug!(search_id = state.id, "search cancelled");
                return;
            }
            let _ = ctx
                .bus
                .send_action(Action::SearchMessage(SearchMessage::Finished {
                    search_id: state.id,
                    has_more,
                }));
        });
        true
    }
}

pub struct SearchOperationService {
    ctx: OperationContext,
}

impl SearchOperationService {
    pub fn new(
        runtime: tokio::runtime::Handle,
        store: Arc<dyn EntityStore>,
        matcher: Arc<dyn MatchService>,
        bus: KernelBusSender,
        config: &SearchConfig,
    ) -> Self {
        Self {
            ctx: OperationContext {
                runtime,
                store,
                matcher,
                bus,
                page_size: config.page_size.max(1),
                batch_size: config.batch_size.max(1),
            },
        }
    }

    /// Starts scanning the first page of `candidates` right away.
    pub fn start(&self, candidates: Arc<[EntityId]>, parameters: SearchParameters) -> SearchTask {
        let task = SearchTask {
            state: Arc::new(OperationState {
                id: next_search_id(),
                candidates,
                parameters,
                cursor: AtomicUsize::new(0),
                cancelled: AtomicBool::new(false),
                running: AtomicBool::new(false),
            }),
            ctx: self.ctx.clone(),
        };
        tracing::debug!(
            search_id = task.id(),
            candidates = task.state.candidates.len(),
            "search started"
        );
        task.resume();
        task
    }
}

/// Returns whether candidates remain after this page.
fn scan_page(ctx: &OperationContext, state: &OperationState) -> bool {
    let candidates = &state.candidates;
    let total = candidates.len();
    let mut index = state.cursor.load(Ordering::Acquire);
    let mut found = 0usize;
    let mut batch = Vec::new();
    let mut reported_error = false;

    while index < total && found < ctx.page_size {
        if state.cancelled.load(Ordering::Relaxed) {
            return false;
        }

        let end = (index + ctx.batch_size).min(total);
        while index < end && found < ctx.page_size {
            let id = candidates[index];
            index += 1;

            let Some(entity) = ctx.store.entity(id) else {
                continue;
            };
            match ctx.matcher.matches(&entity, &state.parameters) {
                Ok(Some(occurrences)) => {
                    batch.push(SearchResult::new(id, occurrences));
                    found += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    if !reported_error {
                        reported_error = true;
                        tracing::warn!(
                            search_id = state.id,
                            entity = %id,
                            error = %e,
                            "match failed, treating as no match"
                        );
                    }
                }
            }
        }
        state.cursor.store(index, Ordering::Release);

        if state.cancelled.load(Ordering::Relaxed) {
            return false;
        }
        if !batch.is_empty() {
            let results = std::mem::take(&mut batch);
            let sent = ctx
                .bus
                .send_action(Action::SearchMessage(SearchMessage::ResultsAdded {
                    search_id: state.id,
                    results,
                }));
            if sent.is_err() {
                state.cancelled.store(true, Ordering::Relaxed);
                return false;
            }
        }
    }

    index < total
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/operation.rs"]
mod tests;
