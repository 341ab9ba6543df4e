//! Headless search core (state/action/effect).

pub mod action;
pub mod effect;
pub mod search;
pub mod search_bar;
pub mod services;
pub mod store;
pub mod throttle;

pub use action::Action;
pub use effect::Effect;
pub use search::{SearchState, SearchView};
pub use search_bar::SearchBarState;
pub use store::{DispatchResult, Store};
pub use throttle::Throttle;
