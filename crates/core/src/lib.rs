//! Domain logic for the firm's capacity and portfolio dashboard.
//!
//! This crate has no I/O. Callers pass in-memory records and receive derived
//! figures; the only shared state lives in [`store`].

pub mod aggregation;
pub mod annotation;
pub mod benchmark;
pub mod compatibility;
pub mod error;
pub mod ingest;
pub mod roster;
pub mod seasonality;
pub mod store;
pub mod threshold_validation;
pub mod types;
