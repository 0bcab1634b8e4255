//! Command-line interface types and dispatch

pub mod dispatch;
pub mod types;

pub use dispatch::dispatch;
pub use types::{Cli, Commands};
