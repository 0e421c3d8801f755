pub mod auth;
pub mod comments;
pub mod error;
pub mod forum;
pub mod middleware;
pub mod pages;
pub mod resources;

use std::sync::Arc;

use bloom_core::{Catalog, ContentError, Submissions};
use bloom_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub catalog: Catalog,
    pub submissions: Submissions,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, jwt_secret: String) -> AppState {
        Arc::new(Self {
            catalog: Catalog::new(db.clone()),
            submissions: Submissions::new(db.clone()),
            db,
            jwt_secret,
        })
    }
}

/// Run a store-backed operation off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ContentError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
