//! Types produced by the avatar upload service

use avatar_storage::{IncomingFile, StoredLocation};
use serde::Serialize;

/// An accepted file together with where it was stored.
///
/// Built fresh from the incoming file and its location; the incoming record is never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAvatar {
    pub field_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
    /// Filesystem path or object URL
    pub url: String,
    /// Identifier to pass back when deleting
    pub backend_key: String,
}

impl UploadedAvatar {
    pub fn new(file: IncomingFile, location: StoredLocation) -> Self {
        UploadedAvatar {
            field_name: file.field_name,
            original_name: file.original_name,
            content_type: file.content_type,
            size: file.size,
            url: location.url,
            backend_key: location.backend_key,
        }
    }
}

/// A file part dropped because its declared content type is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFile {
    pub field_name: String,
    pub original_name: String,
    pub content_type: String,
}

/// Result of handling one upload request.
///
/// `files` holds exactly the accepted parts, in request order. An empty `files` list is
/// a successful outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub files: Vec<UploadedAvatar>,
    pub rejected: Vec<RejectedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_storage::FileBytes;
    use bytes::Bytes;

    #[test]
    fn uploaded_avatar_serializes_in_camel_case() {
        let file = IncomingFile {
            field_name: "avatar".to_string(),
            original_name: "me.png".to_string(),
            content_type: "image/png".to_string(),
            size: 3,
            bytes: FileBytes::InMemory(Bytes::from_static(b"png")),
        };
        let location = StoredLocation {
            url: "assets/userAvatars/avatar-1-2.png".to_string(),
            backend_key: "avatar-1-2.png".to_string(),
        };

        let json = serde_json::to_value(UploadedAvatar::new(file, location)).unwrap();

        assert_eq!(json["fieldName"], "avatar");
        assert_eq!(json["originalName"], "me.png");
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["size"], 3);
        assert_eq!(json["url"], "assets/userAvatars/avatar-1-2.png");
        assert_eq!(json["backendKey"], "avatar-1-2.png");
    }
}
