use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use bloom_core::resolve_parent;
use bloom_types::api::{Claims, SubmitCommentRequest};

use crate::error::ApiError;
use crate::{AppState, blocking};

/// Post a comment as the authenticated user. The body names the parent via
/// `resource_id` or `forum_post_id`, never both.
pub async fn submit_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let parent = resolve_parent(req.resource_id, req.forum_post_id)?;

    let submissions = state.submissions.clone();
    let comment =
        blocking(move || submissions.submit_comment(claims.sub, &req.content, parent)).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::testutil::{json_body, state};
    use bloom_types::api::ErrorResponse;
    use bloom_types::models::{Comment, CommentParent};

    fn signed_in(state: &AppState) -> Claims {
        let id = Uuid::new_v4();
        state
            .db
            .create_user(&id.to_string(), "maria", "maria@example.org", "hash", chrono::Utc::now())
            .unwrap();
        Claims {
            sub: id,
            username: "maria".into(),
            exp: usize::MAX,
        }
    }

    fn request(resource_id: Option<Uuid>, forum_post_id: Option<Uuid>) -> SubmitCommentRequest {
        SubmitCommentRequest {
            content: "You've got this".into(),
            resource_id,
            forum_post_id,
        }
    }

    #[tokio::test]
    async fn comment_on_resource() {
        let state = state();
        let claims = signed_in(&state);
        let resource = state.submissions.submit_resource("Guide", "Body").unwrap();

        let resp = submit_comment(
            State(state.clone()),
            Extension(claims.clone()),
            Json(request(Some(resource.id), None)),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let comment: Comment = json_body(resp).await;
        assert_eq!(comment.author_id, claims.sub);
        assert_eq!(comment.parent, CommentParent::Resource(resource.id));
    }

    #[tokio::test]
    async fn ambiguous_or_missing_parent_is_bad_request() {
        let state = state();
        let claims = signed_in(&state);
        let resource = state.submissions.submit_resource("Guide", "Body").unwrap();
        let post = state.submissions.submit_forum_post("Chat", "Body").unwrap();

        let both = submit_comment(
            State(state.clone()),
            Extension(claims.clone()),
            Json(request(Some(resource.id), Some(post.id))),
        )
        .await
        .into_response();
        assert_eq!(both.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json_body(both).await;
        assert!(body.error.starts_with("invalid comment"));

        let neither = submit_comment(State(state.clone()), Extension(claims), Json(request(None, None)))
            .await
            .into_response();
        assert_eq!(neither.status(), StatusCode::BAD_REQUEST);

        let on_resource = state.catalog.list_comments_for(CommentParent::Resource(resource.id));
        let on_post = state.catalog.list_comments_for(CommentParent::ForumPost(post.id));
        assert!(on_resource.unwrap().is_empty());
        assert!(on_post.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_parent_is_bad_request() {
        let state = state();
        let claims = signed_in(&state);

        let resp = submit_comment(
            State(state),
            Extension(claims),
            Json(request(None, Some(Uuid::new_v4()))),
        )
        .await
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
