//! Shared HTTP constants (headers, plaintext error bodies).

pub(crate) use dynindex_telemetry::REQUEST_ID_HEADER as HEADER_REQUEST_ID;

pub(crate) const MSG_JSON_PARSER: &str = "JSON parser error";
pub(crate) const MSG_DELETE_REPO_DIR: &str = "Failed to delete repoDir";
pub(crate) const MSG_DELETE_INDEX_DIR: &str = "Failed to delete indexDir";
pub(crate) const MSG_INTERNAL: &str = "Internal server error";

pub(crate) const CONTENT_TYPE_METRICS: &str = "text/plain; version=0.0.4";
