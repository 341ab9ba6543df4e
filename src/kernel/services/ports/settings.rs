use super::config::SearchConfig;
use super::search::MatchOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_dirty_flush_ms")]
    pub dirty_flush_ms: u64,
    #[serde(default = "default_refresh_throttle_ms")]
    pub refresh_throttle_ms: u64,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_recent_token_limit")]
    pub recent_token_limit: usize,
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    #[serde(default)]
    pub options: MatchOptions,
}

fn default_page_size() -> usize {
    SearchConfig::default().page_size
}

fn default_batch_size() -> usize {
    SearchConfig::default().batch_size
}

fn default_dirty_flush_ms() -> u64 {
    SearchConfig::default().dirty_flush.as_millis() as u64
}

fn default_refresh_throttle_ms() -> u64 {
    SearchConfig::default().refresh_throttle.as_millis() as u64
}

fn default_suggestion_limit() -> usize {
    SearchConfig::default().suggestion_limit
}

fn default_recent_token_limit() -> usize {
    SearchConfig::default().recent_token_limit
}

fn default_worker_threads() -> usize {
    SearchConfig::default().worker_threads
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            batch_size: default_batch_size(),
            dirty_flush_ms: default_dirty_flush_ms(),
            refresh_throttle_ms: default_refresh_throttle_ms(),
            suggestion_limit: default_suggestion_limit(),
            recent_token_limit: default_recent_token_limit(),
            worker_threads: default_worker_threads(),
            options: MatchOptions::default(),
        }
    }
}

impl Settings {
    pub fn search_config(&self) -> SearchConfig {
        let s = &self.search;
        SearchConfig {
            page_size: s.page_size.max(1),
            batch_size: s.batch_size.max(1),
            dirty_flush: Duration::from_millis(s.dirty_flush_ms),
            refresh_throttle: Duration::from_millis(s.refresh_throttle_ms),
            suggestion_limit: s.suggestion_limit,
            recent_token_limit: s.recent_token_limit,
            worker_threads: s.worker_threads.max(1),
            default_options: s.options,
        }
    }
}
