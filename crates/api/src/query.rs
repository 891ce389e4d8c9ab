//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for "most recent N" endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
