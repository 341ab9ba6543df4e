use super::search::MatchOptions;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Results delivered per page before the operation pauses.
    pub page_size: usize,
    /// Candidates evaluated between two result batches.
    pub batch_size: usize,
    pub dirty_flush: Duration,
    pub refresh_throttle: Duration,
    pub suggestion_limit: usize,
    pub recent_token_limit: usize,
    pub worker_threads: usize,
    pub default_options: MatchOptions,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            batch_size: 100,
            dirty_flush: Duration::from_millis(250),
            refresh_throttle: Duration::from_secs(3),
            suggestion_limit: 8,
            recent_token_limit: 20,
            worker_threads: 2,
            default_options: MatchOptions::default(),
        }
    }
}
