/// Surrogate keys for items and proposals are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Users are keyed by their 11-digit national ID (digits only).
pub type NationalId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
