//! Decoded body of an index request.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Repository to clone, fetch and index.
///
/// Decoding is strict: both fields are required, unknown fields are rejected,
/// and nothing may follow the JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexRequest {
    /// Location the repository is cloned from.
    #[serde(rename = "CloneURL")]
    pub clone_url: String,
    /// Numeric repository identifier; names the bare clone and the shards.
    #[serde(rename = "RepoID")]
    pub repo_id: u32,
}

impl IndexRequest {
    /// Decode a request body.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Decode`] for malformed JSON, missing or unknown
    /// fields, out-of-range identifiers, or trailing data.
    pub fn from_json(body: &[u8]) -> PipelineResult<Self> {
        serde_json::from_slice(body).map_err(|source| PipelineError::Decode { source })
    }
}
