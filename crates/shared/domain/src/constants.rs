//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum email length (RFC 5321)
pub const EMAIL_MAX_LENGTH: usize = 254;

// =============================================================================
// Domain events
// =============================================================================

pub const EVENT_USER_REGISTERED: &str = "UserRegistered";
pub const EVENT_USER_PHONE_CHANGED: &str = "UserPhoneChanged";
pub const EVENT_USER_NAME_CHANGED: &str = "UserNameChanged";
pub const EVENT_USER_PASSWORD_CHANGED: &str = "UserPasswordChanged";
pub const EVENT_USER_LOGGED_IN: &str = "UserLoggedIn";

// =============================================================================
// Authentication
// =============================================================================

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Default refresh token lifetime in hours (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_HOURS: i64 = 168;

/// Upper bound for the configured access token lifetime (1 day)
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Upper bound for the configured refresh token lifetime (1 year)
pub const MAX_REFRESH_TOKEN_TTL_HOURS: i64 = 365 * 24;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Background event writes
// =============================================================================

/// Default number of background event writers
pub const DEFAULT_EVENT_WORKERS: usize = 4;

/// Default number of event batches that may wait for a writer
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;
