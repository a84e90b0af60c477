//! Avatar content-type allow-list.

use avatar_core::constants::ALLOWED_AVATAR_CONTENT_TYPES;

/// Whether a declared content type may be stored as an avatar.
///
/// Exact, case-sensitive match against the allow-list. The declared type comes from the
/// client and is not sniffed from the bytes.
pub fn accept(declared_mime_type: &str) -> bool {
    ALLOWED_AVATAR_CONTENT_TYPES.contains(&declared_mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_image_types() {
        assert!(accept("image/jpeg"));
        assert!(accept("image/jpg"));
        assert!(accept("image/png"));
    }

    #[test]
    fn rejects_everything_else() {
        for mime in [
            "",
            "IMAGE/PNG",
            "Image/Jpeg",
            "image/gif",
            "image/webp",
            "image/svg+xml",
            "application/octet-stream",
            "image/png; charset=binary",
            " image/png",
            "text/plain",
        ] {
            assert!(!accept(mime), "{:?} should be rejected", mime);
        }
    }
}
