use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{reputation::store::{self, UserReputation}, session, AppError, AppResult};

#[derive(Serialize)]
pub(crate) struct MeView {
    pub(crate) id: String,
    pub(crate) handle: String,
    pub(crate) alias: String,
    pub(crate) reputation: UserReputation,
}

#[debug_handler]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<MeView>> {
    let user_id = session::require_user(&session).await?;

    let Some((handle, alias)): Option<(String, String)> =
        sqlx::query_as("SELECT handle,alias FROM users WHERE id=?")
            .bind(&user_id)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::NotFound("user"));
    };

    let reputation = store::load(&db_pool, &user_id, &store::today_utc()).await?;

    Ok(Json(MeView {
        id: user_id,
        handle,
        alias,
        reputation,
    }))
}
