//! Post endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;

use super::dto::PostResponse;
use crate::AppState;
use crate::error::AppError;
use crate::metrics::POSTS_TOTAL;
use crate::service::{NewPost, PostService};

/// Post creation request
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub repo_link: Option<String>,
    pub deployed_link: Option<String>,
    pub created_by: String,
}

/// POST /api/v1/posts
async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let post = PostService::new(state.db.clone())
        .create(NewPost {
            title: request.title,
            body: request.body,
            tags: request.tags,
            repo_link: request.repo_link,
            deployed_link: request.deployed_link,
            created_by: request.created_by,
        })
        .await?;

    POSTS_TOTAL.inc();

    Ok((StatusCode::CREATED, Json(PostResponse::from(&post))))
}

/// GET /api/v1/posts/:id
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let post = PostService::new(state.db.clone()).get(&id).await?;
    Ok(Json(PostResponse::from(&post)))
}

/// DELETE /api/v1/posts/:id
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    PostService::new(state.db.clone()).delete(&id).await?;

    POSTS_TOTAL.dec();

    Ok(StatusCode::NO_CONTENT)
}

/// Create posts router
pub fn posts_router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", axum::routing::get(get_post).delete(delete_post))
}
