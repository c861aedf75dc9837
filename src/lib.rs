pub mod auth;
pub mod conversations;
pub mod db;
pub mod gate;
pub mod reputation;
pub mod session;
pub mod tier;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub tx: broadcast::Sender<conversations::MessageEvent>,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(format!("expected {field} in {self}"))?
            .as_str()
            .ok_or(format!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        self.get(field)
        .ok_or(format!("expected {field} in {self}").into())
    }
}


pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Sender is out of new higher-tier conversations for the day.
    /// Kept apart from `Internal` so the client can tell quota exhaustion
    /// from an actual failure.
    DailyLimitReached,
    Unauthorized,
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::DailyLimitReached => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "DAILY_LIMIT_REACHED",
                    "message": "Daily conversation limit reached. You can start more conversations tomorrow.",
                })),
            )
                .into_response(),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "not logged in").into_response(),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("no such {what}")).into_response(),
            AppError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{}\n\n{}", err, err.backtrace()),
                )
                    .into_response()
            }
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::Internal(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Internal(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(anyhow::Error);
apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(reqwest::Error);
apperr_impl!(uuid::Error);
apperr_impl!(oauth2::url::ParseError);

impl<E: core::error::Error + Send + Sync + 'static, R: oauth2::ErrorResponse + Send + Sync + 'static> From<oauth2::RequestTokenError<E, R>> for AppError {
    fn from(err: oauth2::RequestTokenError<E, R>) -> Self {
        Self::Internal(anyhow::Error::from(err))
    }
}
