pub mod api;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod hub;
pub mod monitor;
pub mod persist;
pub mod sources;
pub mod state;
pub mod types;
pub mod util;
