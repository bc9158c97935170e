//! Structured logging field name constants for scribe.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, cache hit/miss, config choices |

/// Subsystem originating the log event.
/// Values: "api", "db", "cache"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notebook_service", "note_service", "pool", "view_cache"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "get", "delete", "add_tags"
pub const OPERATION: &str = "op";

/// Notebook id being operated on.
pub const NOTEBOOK_ID: &str = "notebook_id";

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// Number of tags touched by a tag operation.
pub const TAG_COUNT: &str = "tag_count";

/// Whether a cache lookup was a hit.
pub const CACHE_HIT: &str = "cache_hit";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
