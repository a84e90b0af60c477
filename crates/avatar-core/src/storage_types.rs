use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage backend types
///
/// Which concrete backend serves uploads for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Azure,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Azure => write!(f, "azure"),
        }
    }
}
