//! Signup and login endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use common::UserId;
use domain::User;
use serde::Serialize;
use store::Store;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub phone_number: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            phone_number: user.phone_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub is_staff: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// POST /auth/signup: register an account.
#[tracing::instrument(skip(state, body))]
pub async fn signup<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.accounts.register(&body).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login: exchange email and password for a bearer token.
#[tracing::instrument(skip(state, body))]
pub async fn login<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let login = state.accounts.login(&body).await?;

    Ok(Json(LoginResponse {
        token: login.token,
        user: LoginUser {
            id: login.user.id,
            email: login.user.email,
            username: login.user.username,
            is_staff: login.user.is_staff,
        },
    }))
}
