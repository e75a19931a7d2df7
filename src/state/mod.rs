pub mod store;

pub use store::{GlobalState, StateStore};
