use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use bloom_types::api::{Claims, ForumPostDetailResponse, SubmitForumPostRequest};
use bloom_types::models::CommentParent;

use crate::error::ApiError;
use crate::{AppState, blocking};

pub async fn list_forum_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog.clone();
    let posts = blocking(move || catalog.list_forum_posts()).await?;
    Ok(Json(posts))
}

pub async fn get_forum_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.catalog.clone();
    let (post, comments) = blocking(move || {
        let post = catalog.get_forum_post(id)?;
        let comments = catalog.list_comments_for(CommentParent::ForumPost(id))?;
        Ok((post, comments))
    })
    .await?;

    Ok(Json(ForumPostDetailResponse { post, comments }))
}

pub async fn submit_forum_post(
    State(state): State<AppState>,
    Json(req): Json<SubmitForumPostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submissions = state.submissions.clone();
    let post = blocking(move || submissions.submit_forum_post(&req.title, &req.content)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_forum_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let submissions = state.submissions.clone();
    blocking(move || submissions.delete_forum_post(id)).await?;
    info!("Forum post {} removed by {}", id, claims.username);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{json_body, state};
    use bloom_types::models::ForumPost;

    #[tokio::test]
    async fn overlong_title_is_bad_request() {
        let resp = submit_forum_post(
            State(state()),
            Json(SubmitForumPostRequest {
                title: "x".repeat(201),
                content: "body".into(),
            }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn detail_includes_comments_in_order() {
        let state = state();
        let author = uuid::Uuid::new_v4();
        state
            .db
            .create_user(&author.to_string(), "maria", "maria@example.org", "hash", chrono::Utc::now())
            .unwrap();

        let resp = submit_forum_post(
            State(state.clone()),
            Json(SubmitForumPostRequest {
                title: "First time, scared".into(),
                content: "Any advice?".into(),
            }),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let post: ForumPost = json_body(resp).await;

        let parent = CommentParent::ForumPost(post.id);
        state.submissions.submit_comment(author, "You've got this", parent).unwrap();
        state.submissions.submit_comment(author, "Same here", parent).unwrap();

        let detail: ForumPostDetailResponse =
            json_body(get_forum_post(State(state), Path(post.id)).await.into_response()).await;
        assert_eq!(detail.post, post);
        let contents: Vec<_> = detail.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["You've got this", "Same here"]);
    }
}
