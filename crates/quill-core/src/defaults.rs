//! Centralized default constants for quill.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Fixed page size for paginated note views (list, archived).
///
/// A configuration constant, not a per-request parameter.
pub const PAGE_SIZE: i64 = 4;

// =============================================================================
// SESSIONS & TOKENS
// =============================================================================

/// Session lifetime in hours.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Password-reset token validity window in minutes.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Random-secret length (alphanumeric characters) for issued tokens.
pub const TOKEN_SECRET_LEN: usize = 48;

/// Prefix carried by session access tokens.
pub const SESSION_TOKEN_PREFIX: &str = "qn_at_";

/// Prefix carried by password-reset tokens.
pub const RESET_TOKEN_PREFIX: &str = "qn_rt_";

// =============================================================================
// VALIDATION BOUNDS
// =============================================================================

/// Minimum note title length.
pub const TITLE_MIN_LEN: usize = 2;

/// Maximum note title length.
pub const TITLE_MAX_LEN: usize = 50;

/// Minimum note description length.
pub const DESCRIPTION_MIN_LEN: usize = 3;

/// Maximum note description length on create.
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Maximum note description length on update.
pub const DESCRIPTION_UPDATE_MAX_LEN: usize = 1000;

/// Minimum person/label name length.
pub const NAME_MIN_LEN: usize = 2;

/// Maximum person/label name length.
pub const NAME_MAX_LEN: usize = 100;

/// Maximum email length.
pub const EMAIL_MAX_LEN: usize = 150;

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 6;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Outbound notification delivery timeout in seconds.
pub const NOTIFY_TIMEOUT_SECS: u64 = 10;
