//! Cabinet API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! annotation boards) so integration tests and the binary entrypoint can
//! both access them.

pub mod annotations;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
