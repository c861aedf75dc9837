mod can_start;
mod convo;
mod msg;
mod start;
mod thread;
mod ws;

pub use convo::{create, find, message_count, pair};
pub use msg::{send, MessageRecord};

use axum::{routing::{get, post}, Router};

use crate::AppState;

/// Fanout payload for live thread subscribers.
#[derive(Clone, Debug)]
pub struct MessageEvent {
    pub conversation_id: uuid::Uuid,
    pub payload: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{peer_id}", get(thread::thread))
        .route("/{peer_id}/can-start", get(can_start::can_start))
        .route("/{peer_id}/messages", post(msg::send_message))
        .route("/{peer_id}/ws", get(ws::thread_ws))
}
