pub mod classify;
pub mod store;

mod update;
mod view;

pub use classify::{classify, classify_score, DefaultScorePolicy, ReputationSignals, ScorePolicy};
pub use store::UserReputation;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/reputation", get(view::reputation).put(update::set_reputation))
        .route("/{user_id}/reputation/evaluate", post(update::evaluate))
}
