//! console-search - search engine for a network/log debugging console
//!
//! Module layout:
//! - kernel: headless search state (Action, Effect, Store) plus services
//!   (ports and their adapters: matcher, paged operations, suggestions,
//!   recent tokens, settings, entity store)
//! - app: the search session that runs kernel effects on the worker runtime

pub mod app;
pub mod kernel;
