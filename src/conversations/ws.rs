use axum::{
    debug_handler,
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;

use crate::{reputation::store, session, AppError, AppResult, AppState};

use super::{convo, msg::{self, SendMessageBody}, MessageEvent};

/// Live stream for one thread. Only conversations that already exist can
/// be subscribed to; starting a thread goes through the message endpoint
/// where the gate runs. Inbound frames are sends into the thread, and a
/// rejected send drops the frame rather than the socket.
#[debug_handler(state = AppState)]
pub(crate) async fn thread_ws(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<MessageEvent>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let user_id = session::require_user(&session).await?;

    let Some(conversation_id) = convo::find(&db_pool, &user_id, &peer_id).await? else {
        return Err(AppError::NotFound("conversation"));
    };

    Ok(ws.on_upgrade(move |stream| async move {
        let mut rx = tx.subscribe();
        let (mut sender, mut receiver) = stream.split();

        let broadcast_task = tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if event.conversation_id != conversation_id {
                    continue;
                }
                if sender.send(event.payload.into()).await.is_err() {
                    break;
                }
            }
        });

        while let Some(Ok(frame)) = receiver.next().await {
            let Ok(SendMessageBody { content }) = serde_json::from_slice(&frame.into_data()) else {
                continue;
            };

            match msg::send(&db_pool, &user_id, &peer_id, &content, &store::today_utc()).await {
                Ok(m) => {
                    let _ = tx.send(MessageEvent {
                        conversation_id: m.conversation_id,
                        payload: serde_json::to_string(&m).unwrap_or_default(),
                    });
                }
                Err(err) => {
                    tracing::debug!("ws send rejected: {err:?}");
                }
            }
        }

        broadcast_task.abort();
    }))
}
