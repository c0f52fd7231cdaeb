//! Structured logging schema and field name constants for notas.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log output can be filtered by standardized field names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Lost work (a fire-and-forget mutation failed), requires attention |
//! | WARN  | Recoverable issue, best-effort step skipped |
//! | INFO  | Lifecycle events (open, close), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (list refreshes) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "repository", "visibility", "attachments", "service"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "note_store", "watch", "manager"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "upsert", "search", "add_attachment", "refresh"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// Search query text.
pub const QUERY: &str = "query";

/// Attachment file path being copied or removed.
pub const FILE_PATH: &str = "file_path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a copied attachment.
pub const SIZE_BYTES: &str = "size_bytes";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
