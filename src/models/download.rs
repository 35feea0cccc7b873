//! Download request model.

use serde::{Deserialize, Serialize};

/// Body accepted by `/api/download`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// arXiv identifiers, in the order they should be fetched
    #[serde(default)]
    pub paper_ids: Vec<String>,
}
