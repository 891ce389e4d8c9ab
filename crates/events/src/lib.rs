//! Cabinet event bus and activity log.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DashboardEvent`]: the domain event envelope.
//! - [`ActivityLog`]: background consumer keeping the most recent events in
//!   memory for the activity feed.

pub mod activity;
pub mod bus;

pub use activity::ActivityLog;
pub use bus::{DashboardEvent, EventBus};
