use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Comment, ForumPost, Resource};

// -- JWT Claims --

/// Claims carried by bearer tokens. Issued by the login/register handlers and
/// checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Resources & forum --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitResourceRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitForumPostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceDetailResponse {
    pub resource: Resource,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForumPostDetailResponse {
    pub post: ForumPost,
    pub comments: Vec<Comment>,
}

// -- Comments --

/// Both parent fields are optional on the wire; the submission layer rejects
/// anything other than exactly one.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitCommentRequest {
    pub content: String,
    #[serde(default)]
    pub resource_id: Option<Uuid>,
    #[serde(default)]
    pub forum_post_id: Option<Uuid>,
}

// -- Pages --

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub resources: Vec<Resource>,
    pub forum_posts: Vec<ForumPost>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub resources: Vec<Resource>,
    pub forum_posts: Vec<ForumPost>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
