use serde::Serialize;
use sqlx::SqliteExecutor;
use time::{Date, OffsetDateTime};

use crate::{tier::ReputationTier, AppResult};

/// One row per user. `higher_tier_conversations_today` is the effective
/// count for `last_conversation_date`; a row whose date is not today reads
/// as zero (day rollover is lazy, there is no reset job).
#[derive(Debug, Clone, Serialize)]
pub struct UserReputation {
    pub user_id: String,
    pub tier: ReputationTier,
    pub score: i64,
    pub daily_higher_tier_limit: i64,
    pub higher_tier_conversations_today: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_conversation_date: Option<String>,
}

pub fn date_str(d: Date) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

pub fn today_utc() -> String {
    date_str(OffsetDateTime::now_utc().date())
}

/// Reputation row every account starts with: tier new, counter zero.
pub async fn ensure(db: impl SqliteExecutor<'_>, user_id: &str) -> AppResult<()> {
    sqlx::query("INSERT OR IGNORE INTO reputations (user_id) VALUES (?)")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Read the reputation document as of `today` (YYYY-MM-DD). A missing row
/// reads as the default new-tier record; a counter from an earlier day
/// reads as zero. Neither case writes anything.
pub async fn load(db: impl SqliteExecutor<'_>, user_id: &str, today: &str) -> AppResult<UserReputation> {
    let row: Option<(String, i64, i64, Option<String>)> = sqlx::query_as(
        "SELECT tier,score,higher_tier_conversations_today,last_conversation_date
         FROM reputations WHERE user_id=?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    let (tier, score, counter, last_date) = row.unwrap_or(("new".to_owned(), 0, 0, None));
    let tier: ReputationTier = tier.parse()?;
    let effective = if last_date.as_deref() == Some(today) { counter } else { 0 };

    Ok(UserReputation {
        user_id: user_id.to_owned(),
        tier,
        score,
        daily_higher_tier_limit: tier.daily_limit(),
        higher_tier_conversations_today: effective,
        last_conversation_date: last_date,
    })
}

/// Upstream recalculation writes tier and score here. Only those two
/// columns are touched, so a concurrent counter bump is never clobbered.
pub async fn set_tier_score(
    db: impl SqliteExecutor<'_>,
    user_id: &str,
    tier: ReputationTier,
    score: i64,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO reputations (user_id,tier,score) VALUES (?,?,?)
         ON CONFLICT(user_id) DO UPDATE SET tier=excluded.tier, score=excluded.score",
    )
    .bind(user_id)
    .bind(tier.as_str())
    .bind(score)
    .execute(db)
    .await?;
    Ok(())
}

/// Count one higher-tier conversation start against `today`. A single
/// conditional upsert, so racing first-messages serialize in the store
/// instead of read-modify-writing a stale counter; the CASE folds the lazy
/// day rollover into the same statement. Returns the new count.
pub async fn record_higher_tier_start(
    db: impl SqliteExecutor<'_>,
    user_id: &str,
    today: &str,
) -> AppResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "INSERT INTO reputations (user_id,higher_tier_conversations_today,last_conversation_date)
         VALUES (?1, 1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET
            higher_tier_conversations_today =
                CASE WHEN reputations.last_conversation_date = ?2
                     THEN reputations.higher_tier_conversations_today + 1
                     ELSE 1 END,
            last_conversation_date = ?2
         RETURNING higher_tier_conversations_today",
    )
    .bind(user_id)
    .bind(today)
    .fetch_one(db)
    .await?;
    Ok(count)
}
