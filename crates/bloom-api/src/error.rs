use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bloom_core::ContentError;
use bloom_types::api::ErrorResponse;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Content(ContentError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Content(ContentError::Validation(_) | ContentError::InvalidComment(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Content(ContentError::Store(_)) | Self::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {:#}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloom_core::{EntityKind, ValidationError};
    use uuid::Uuid;

    #[test]
    fn maps_taxonomy_to_status() {
        let not_found = ApiError::from(ContentError::not_found(EntityKind::Resource, Uuid::nil()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(ContentError::Validation(ValidationError::Empty { field: "title" }));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let comment = ApiError::from(ContentError::InvalidComment("no parent given"));
        assert_eq!(comment.status(), StatusCode::BAD_REQUEST);

        let store = ApiError::from(ContentError::Store(anyhow::anyhow!("disk on fire")));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let resp = ApiError::from(ContentError::Store(anyhow::anyhow!("disk on fire"))).into_response();
        let body: ErrorResponse = crate::testutil::json_body(resp).await;
        assert_eq!(body.error, "internal server error");
    }
}
