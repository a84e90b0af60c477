//! Upload limits and defaults shared across crates.

/// Per-file ceiling for avatar uploads (20 MiB).
pub const MAX_AVATAR_SIZE_BYTES: usize = 20 * 1024 * 1024;

/// Declared content types accepted for avatars. Matched exactly and case-sensitively.
pub const ALLOWED_AVATAR_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Extension used when the client-supplied file name has none.
pub const DEFAULT_AVATAR_EXTENSION: &str = ".png";

/// Field label used for generated names when the multipart field has no name.
pub const DEFAULT_FIELD_NAME: &str = "avatar";

/// Content type recorded on cloud objects when the client declared none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
