//! Search services
//!
//! - TermPattern: compiled substring / whole-word / regex terms
//! - ConsoleSearchService: default `MatchService`
//! - SearchOperationService: paged, cancellable background scans

mod matcher;
mod operation;
mod service;

pub use matcher::{occurrences_in, TermPattern};
pub use operation::{SearchOperationService, SearchTask};
pub use service::ConsoleSearchService;
