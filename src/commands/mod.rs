//! Command handlers
//!
//! Each handler consumes the [`ObservableTaskStore`](crate::store::ObservableTaskStore)
//! API only: take a snapshot or submit a mutation, then render the result.
//! Validation lives inside the mutation functions, so a rejected command
//! never touches the persisted graph.

pub mod add;
pub mod complete;
pub mod depend;
pub mod list;
pub mod reword;
pub mod watch;
