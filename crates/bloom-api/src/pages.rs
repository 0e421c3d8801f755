use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use bloom_types::api::{HomeResponse, SearchQuery, SearchResponse};

use crate::error::ApiError;
use crate::{AppState, blocking};

/// Everything on the front page: all resources and all forum posts.
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog.clone();
    let (resources, forum_posts) = blocking(move || {
        Ok((catalog.list_resources()?, catalog.list_forum_posts()?))
    })
    .await?;

    Ok(Json(HomeResponse {
        resources,
        forum_posts,
    }))
}

/// `GET /search?q=...`. A missing `q` is the empty query and matches
/// everything.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog.clone();
    let q = query.q.clone();
    let hits = blocking(move || catalog.search(&q)).await?;

    Ok(Json(SearchResponse {
        query: query.q,
        resources: hits.resources,
        forum_posts: hits.forum_posts,
    }))
}
