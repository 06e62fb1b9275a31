//! Caller identity.
//!
//! The reverse proxy in front of this service authenticates the request and
//! forwards the caller's user id in [`USER_ID_HEADER`]. Here we only resolve
//! that id to an active user.
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use bank::{BankError, models::User};

use crate::{error::AppError, state::AppState};

pub const USER_ID_HEADER: &str = "x-user-id";

pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id: i64 = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .ok_or(AppError::Unauthorized)?;

        let user = match state.database.user(user_id).await {
            Ok(user) => user,
            Err(BankError::NotFound(_)) => return Err(AppError::Unauthorized),
            Err(e) => return Err(e.into()),
        };

        if !user.is_active {
            return Err(AppError::Forbidden("Inactive user".to_string()));
        }

        Ok(Self(user))
    }
}

pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(user))
    }
}
