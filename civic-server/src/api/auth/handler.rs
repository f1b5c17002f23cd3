//! Authentication Handlers
//!
//! Credentials are verified against argon2 hashes in the `user` table. The
//! error message and a fixed delay are uniform across "no such user" and
//! "wrong password" so the endpoint leaks nothing about which one happened.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub role: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub role: String,
    pub name: String,
    pub token: String,
}

/// POST /login - 用户登录
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = UserRepository::new(state.get_db())
        .find_by_role_and_username(&req.role, &req.username)
        .await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) if u.is_active => u,
        Some(_) => {
            tracing::warn!(username = %req.username, "Login failed - account disabled");
            return Err(AppError::invalid_credentials());
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let token = state
        .get_jwt_service()
        .generate_token(&user_id, &user.username, &user.role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(username = %user.username, role = %user.role, "Login successful");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        role: user.role,
        name: user.name.unwrap_or_else(|| req.username.clone()),
        token,
    }))
}
