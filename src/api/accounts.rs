//! Account endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;

use super::dto::{AccountResponse, PostResponse};
use crate::AppState;
use crate::error::AppError;
use crate::metrics::{ACCOUNTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::{AccountChanges, AccountService, NewAccount, PostService};

/// Registration request
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_image_url: Option<String>,
}

/// Account update request
///
/// Omitted fields are untouched. `profile_image_url: null` is
/// indistinguishable from omission in JSON, so clearing the image goes
/// through `clear_profile_image: true`.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub clear_profile_image: bool,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn account_service(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), state.config.security.bcrypt_cost)
}

/// POST /api/v1/accounts
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/v1/accounts"])
        .start_timer();

    let account = account_service(&state)
        .create(NewAccount {
            username: request.username,
            email: request.email,
            password: request.password,
            profile_image_url: request.profile_image_url,
        })
        .await?;

    ACCOUNTS_TOTAL.inc();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/v1/accounts", "201"])
        .inc();

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// GET /api/v1/accounts/:id
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = account_service(&state).get(&id).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// PATCH /api/v1/accounts/:id
async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let profile_image_url = if request.clear_profile_image {
        Some(None)
    } else {
        request.profile_image_url.map(Some)
    };

    let account = account_service(&state)
        .update(
            &id,
            AccountChanges {
                email: request.email,
                profile_image_url,
                password: request.password,
            },
        )
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// DELETE /api/v1/accounts/:id
async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["DELETE", "/api/v1/accounts/:id"])
        .start_timer();

    account_service(&state).delete(&id).await?;

    ACCOUNTS_TOTAL.dec();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["DELETE", "/api/v1/accounts/:id", "204"])
        .inc();

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/login
///
/// Credential verification only; no session or token is issued.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = account_service(&state)
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(AccountResponse::from(&account)))
}

/// GET /api/v1/accounts/:id/posts
async fn list_account_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = PostService::new(state.db.clone())
        .posts_by_account(&id)
        .await?;

    Ok(Json(posts.iter().map(PostResponse::from).collect()))
}

/// GET /api/v1/accounts/:id/friends
async fn list_friends(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let friends = account_service(&state).friends(&id).await?;
    Ok(Json(friends.iter().map(AccountResponse::from).collect()))
}

/// PUT /api/v1/accounts/:id/friends/:friend_id
async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    account_service(&state).add_friend(&id, &friend_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/accounts/:id/friends/:friend_id
async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    account_service(&state)
        .remove_friend(&id, &friend_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create accounts router
pub fn accounts_router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route(
            "/accounts/:id",
            get(get_account)
                .patch(update_account)
                .delete(delete_account),
        )
        .route("/accounts/:id/posts", get(list_account_posts))
        .route("/accounts/:id/friends", get(list_friends))
        .route(
            "/accounts/:id/friends/:friend_id",
            put(add_friend).delete(remove_friend),
        )
        .route("/login", post(login))
}
