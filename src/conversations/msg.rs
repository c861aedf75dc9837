use axum::{debug_handler, extract::{Path, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{gate, reputation::store, session, AppError, AppResult, AppState};

use super::{convo, start, MessageEvent};

#[derive(Deserialize)]
pub(crate) struct SendMessageBody {
    pub(crate) content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: String,
    pub content: String,
    pub sent_at: i64,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_message(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<MessageEvent>>,
    session: Session,
    Json(SendMessageBody { content }): Json<SendMessageBody>,
) -> AppResult<Json<MessageRecord>> {
    let sender_id = session::require_user(&session).await?;

    let msg = send(&db_pool, &sender_id, &peer_id, &content, &store::today_utc()).await?;

    let _ = tx.send(MessageEvent {
        conversation_id: msg.conversation_id,
        payload: serde_json::to_string(&msg)?,
    });

    Ok(Json(msg))
}

/// Send one message from `sender_id` to `recipient_id`.
///
/// The first message of a conversation is what starts it, so that path
/// runs the permission gate and the start accounting inside one
/// transaction with the inserts: a denied start leaves no conversation
/// behind, and two racing first-messages can't both take the last daily
/// slot. Messages into a thread that already has any skip all of it.
pub async fn send(
    db_pool: &SqlitePool,
    sender_id: &str,
    recipient_id: &str,
    content: &str,
    today: &str,
) -> AppResult<MessageRecord> {
    if sender_id == recipient_id {
        return Err("cannot message yourself")?;
    }

    let mut tx = db_pool.begin().await?;

    let existing = convo::find(&mut *tx, sender_id, recipient_id).await?;
    let starting = match existing {
        Some(id) => convo::message_count(&mut *tx, id).await? == 0,
        None => true,
    };

    if starting {
        let decision = gate::check_permission(&mut tx, sender_id, recipient_id, today).await?;
        if let Some(gate::DenyReason::DailyLimitReached) = decision.reason {
            return Err(AppError::DailyLimitReached);
        }
    }

    let conversation_id = match existing {
        Some(id) => id,
        None => convo::create(&mut *tx, sender_id, recipient_id).await?,
    };

    let id = Uuid::now_v7();
    let sent_at = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("INSERT INTO messages (id,conversation_id,sender_id,content,sent_at) VALUES (?,?,?,?,?)")
        .bind(id.to_string())
        .bind(conversation_id.to_string())
        .bind(sender_id)
        .bind(content)
        .bind(sent_at)
        .execute(&mut *tx)
        .await?;

    if starting {
        start::on_first_message(&mut tx, sender_id, recipient_id, today).await?;
    }

    tx.commit().await?;

    Ok(MessageRecord {
        id,
        conversation_id,
        sender_id: sender_id.to_owned(),
        content: content.to_owned(),
        sent_at,
    })
}
