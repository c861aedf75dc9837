use axum::{debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{tier::ReputationTier, AppResult};

use super::classify::{classify, DefaultScorePolicy, ReputationSignals};
use super::store::{self, UserReputation};

#[derive(Deserialize)]
pub(crate) struct SetReputationBody {
    pub(crate) tier: ReputationTier,
    pub(crate) score: i64,
}

/// Write endpoint for the reputation recalculation process. Takes the
/// recalculated tier and score as given; the counter columns stay whatever
/// they were.
#[debug_handler]
pub(crate) async fn set_reputation(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    Json(SetReputationBody { tier, score }): Json<SetReputationBody>,
) -> AppResult<Json<UserReputation>> {
    store::set_tier_score(&db_pool, &user_id, tier, score).await?;
    tracing::info!(user = %user_id, tier = %tier, score, "reputation updated");

    let rep = store::load(&db_pool, &user_id, &store::today_utc()).await?;
    Ok(Json(rep))
}

/// Run the classifier over a submitted signal set with the default policy
/// and store the result.
#[debug_handler]
pub(crate) async fn evaluate(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    Json(signals): Json<ReputationSignals>,
) -> AppResult<Json<UserReputation>> {
    let (score, tier) = classify(&DefaultScorePolicy, &signals);
    store::set_tier_score(&db_pool, &user_id, tier, score).await?;
    tracing::info!(user = %user_id, tier = %tier, score, "reputation evaluated");

    let rep = store::load(&db_pool, &user_id, &store::today_utc()).await?;
    Ok(Json(rep))
}
