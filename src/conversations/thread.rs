use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{reputation::store, session, tier::ReputationTier, AppError, AppResult};

use super::{convo, MessageRecord};

#[derive(Serialize)]
pub(crate) struct PeerView {
    pub(crate) id: String,
    pub(crate) handle: String,
    pub(crate) alias: String,
    pub(crate) tier: ReputationTier,
}

#[derive(Serialize)]
pub(crate) struct ThreadView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) conversation_id: Option<Uuid>,
    pub(crate) peer: PeerView,
    pub(crate) messages: Vec<MessageRecord>,
}

#[debug_handler]
pub(crate) async fn thread(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<ThreadView>> {
    let user_id = session::require_user(&session).await?;

    let Some((handle, alias)): Option<(String, String)> =
        sqlx::query_as("SELECT handle,alias FROM users WHERE id=?")
            .bind(&peer_id)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::NotFound("user"));
    };

    let peer_rep = store::load(&db_pool, &peer_id, &store::today_utc()).await?;
    let peer = PeerView {
        id: peer_id.clone(),
        handle,
        alias,
        tier: peer_rep.tier,
    };

    let Some(conversation_id) = convo::find(&db_pool, &user_id, &peer_id).await? else {
        return Ok(Json(ThreadView { conversation_id: None, peer, messages: Vec::new() }));
    };

    let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
        "SELECT id,sender_id,content,sent_at FROM messages WHERE conversation_id=? ORDER BY sent_at,id",
    )
    .bind(conversation_id.to_string())
    .fetch_all(&db_pool)
    .await?;

    let mut messages = Vec::with_capacity(rows.len());
    for (id, sender_id, content, sent_at) in rows {
        messages.push(MessageRecord {
            id: Uuid::parse_str(&id)?,
            conversation_id,
            sender_id,
            content,
            sent_at,
        });
    }

    Ok(Json(ThreadView {
        conversation_id: Some(conversation_id),
        peer,
        messages,
    }))
}
