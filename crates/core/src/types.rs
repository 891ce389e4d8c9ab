/// Identifiers for collaborators, client files, assignments, prospects and
/// managers. Seed data and API payloads use plain integers.
pub type EntityId = i64;

/// Durations are expressed in hours throughout the domain.
pub type Hours = f64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
