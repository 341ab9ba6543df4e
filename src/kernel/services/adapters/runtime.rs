//! Async runtime adapter: runs search side work off the interactive context
//! and posts the outcome back on the kernel bus.

use super::suggestions::ConsoleSearchSuggestionsService;
use crate::kernel::services::bus::KernelBusSender;
use crate::kernel::services::ports::{EntityStore, SearchToken, SuggestionRequest};
use crate::kernel::Action;
use std::io;
use std::sync::Arc;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    bus: KernelBusSender,
}

impl AsyncRuntime {
    pub fn new(worker_threads: usize, bus: KernelBusSender) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("console-search-worker")
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self { runtime, bus })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Replies with `Action::SuggestionsUpdated` carrying the request generation.
    pub fn refresh_suggestions(
        &self,
        service: Arc<ConsoleSearchSuggestionsService>,
        store: Arc<dyn EntityStore>,
        request: SuggestionRequest,
    ) {
        let bus = self.bus.clone();
        self.runtime.spawn(async move {
            let generation = request.generation;
            let result = tokio::task::spawn_blocking(move || {
                if request.criteria_empty {
                    (
                        service.default_top_suggestions(&request.tokens),
                        service.default_suggested_scopes(),
                    )
                } else {
                    let hosts = store.hosts();
                    let top = service.top_suggestions(&request.search_text, &hosts, &request.tokens);
                    (top, Vec::new())
                }
            })
            .await;

            match result {
                Ok((top, scopes)) => {
                    let _ = bus.send_action(Action::SuggestionsUpdated {
                        generation,
                        top,
                        scopes,
                    });
                }
                Err(e) => {
                    tracing::error!(generation, error = %e, "suggestion refresh failed");
                }
            }
        });
    }

    pub fn save_recent_token(&self, service: Arc<ConsoleSearchSuggestionsService>, token: SearchToken) {
        self.runtime.spawn(async move {
            if let Err(e) =
                tokio::task::spawn_blocking(move || service.save_recent_token(token)).await
            {
                tracing::warn!(error = %e, "failed to save recent token");
            }
        });
    }
}
