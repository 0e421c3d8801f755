use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use bloom_types::api::{Claims, ResourceDetailResponse, SubmitResourceRequest};
use bloom_types::models::CommentParent;

use crate::error::ApiError;
use crate::{AppState, blocking};

pub async fn list_resources(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog.clone();
    let resources = blocking(move || catalog.list_resources()).await?;
    Ok(Json(resources))
}

/// The resource together with its comment thread.
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog.clone();
    let (resource, comments) = blocking(move || {
        let resource = catalog.get_resource(id)?;
        let comments = catalog.list_comments_for(CommentParent::Resource(id))?;
        Ok((resource, comments))
    })
    .await?;

    Ok(Json(ResourceDetailResponse { resource, comments }))
}

pub async fn submit_resource(
    State(state): State<AppState>,
    Json(req): Json<SubmitResourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submissions = state.submissions.clone();
    let resource =
        blocking(move || submissions.submit_resource(&req.title, &req.description)).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let submissions = state.submissions.clone();
    blocking(move || submissions.delete_resource(id)).await?;
    info!("Resource {} removed by {}", id, claims.username);
    Ok(StatusCode::NO_CONTENT)
}
