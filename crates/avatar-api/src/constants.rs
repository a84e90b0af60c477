//! API constants

/// Versioned prefix for every avatar route.
pub const API_PREFIX: &str = "/api/v1";
