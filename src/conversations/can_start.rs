use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{gate, reputation::store, session, AppResult};

use super::convo;

/// Pre-send probe for the client: may the logged-in user start a
/// conversation with this peer right now? Reads only; quota is consumed
/// when the first message actually lands, not here.
#[debug_handler]
pub(crate) async fn can_start(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<gate::Decision>> {
    let user_id = session::require_user(&session).await?;

    let mut conn = db_pool.acquire().await?;

    // a thread with messages in it is already started and never gated
    if let Some(id) = convo::find(&mut *conn, &user_id, &peer_id).await? {
        if convo::message_count(&mut *conn, id).await? > 0 {
            return Ok(Json(gate::Decision::ALLOWED));
        }
    }

    let decision = gate::check_permission(&mut conn, &user_id, &peer_id, &store::today_utc()).await?;
    Ok(Json(decision))
}
