//! Core value types for braid

pub mod task;

pub use task::{Task, TaskId};
