//! Service adapters: runtime specific implementations (IO/async).

pub mod recent;
pub mod runtime;
pub mod search;
pub mod settings;
pub mod store;
pub mod suggestions;

pub use recent::{JsonRecentTokens, MemoryRecentTokens, RecentTokensError};
pub use runtime::AsyncRuntime;
pub use search::{
    occurrences_in, ConsoleSearchService, SearchOperationService, SearchTask, TermPattern,
};
pub use settings::{
    ensure_settings_file, ensure_settings_file_at, get_config_dir, get_log_dir,
    get_recent_tokens_path, get_settings_path, load_settings, load_settings_or_default,
    SettingsError,
};
pub use store::MemoryEntityStore;
pub use suggestions::{fuzzy_score, parse_status, ConsoleSearchSuggestionsService};
