//! Application layer: drives the kernel against real workers.

pub mod session;

pub use session::SearchSession;
