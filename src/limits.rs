use serde::{Deserialize, Serialize};

/// Resource bounds applied while reading uploads. Extraction fails with a
/// resource-limit error instead of growing without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum size of an upload or archive entry, in bytes.
    pub max_file_bytes: u64,
    /// Maximum number of rows extracted from one upload.
    pub max_rows: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 50 * 1024 * 1024,
            max_rows: 200_000,
        }
    }
}
