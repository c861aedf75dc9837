use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, AppError, AppResult};

use super::store::{self, UserReputation};

#[debug_handler]
pub(crate) async fn reputation(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<UserReputation>> {
    session::require_user(&session).await?;

    if sqlx::query_as::<_, (i64,)>("SELECT 1 FROM users WHERE id=?")
        .bind(&user_id)
        .fetch_optional(&db_pool)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("user"));
    }

    let rep = store::load(&db_pool, &user_id, &store::today_utc()).await?;
    Ok(Json(rep))
}
