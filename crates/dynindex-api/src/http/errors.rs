//! Plaintext API errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::constants::{
    MSG_DELETE_INDEX_DIR, MSG_DELETE_REPO_DIR, MSG_INTERNAL, MSG_JSON_PARSER,
};

/// Error returned by handlers; rendered as a `text/plain` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) message: &'static str,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub(crate) const fn json_parser() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MSG_JSON_PARSER)
    }

    pub(crate) const fn delete_repo_dir() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_DELETE_REPO_DIR)
    }

    pub(crate) const fn delete_index_dir() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_DELETE_INDEX_DIR)
    }

    pub(crate) const fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn renders_plaintext_body() {
        let response = ApiError::json_parser().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        assert_eq!(content_type, Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn truncate_errors_are_server_errors() {
        assert_eq!(
            ApiError::delete_repo_dir().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::delete_index_dir().message, "Failed to delete indexDir");
        assert_eq!(ApiError::internal().status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
