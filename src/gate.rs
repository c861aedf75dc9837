use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{reputation::store, tier::UNLIMITED, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenyReason {
    #[serde(rename = "DAILY_LIMIT_REACHED")]
    DailyLimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl Decision {
    pub const ALLOWED: Decision = Decision { allowed: true, reason: None };

    pub fn denied(reason: DenyReason) -> Decision {
        Decision { allowed: false, reason: Some(reason) }
    }
}

/// May `sender_id` start a new conversation with `recipient_id` today?
///
/// Same- or lower-tier recipients are always fine and the counter is not
/// even read. A strictly-higher-tier recipient costs one of the sender's
/// daily slots, so the sender's effective count for `today` is checked
/// against their tier's limit. Pure read, no writes; a store error
/// propagates instead of defaulting to allowed, so the gate fails closed.
///
/// Existing conversations are the caller's concern: this gate prices
/// starting a new thread, never messages inside one that already has any.
pub async fn check_permission(
    conn: &mut SqliteConnection,
    sender_id: &str,
    recipient_id: &str,
    today: &str,
) -> AppResult<Decision> {
    let sender = store::load(&mut *conn, sender_id, today).await?;
    let recipient = store::load(&mut *conn, recipient_id, today).await?;

    if recipient.tier <= sender.tier {
        return Ok(Decision::ALLOWED);
    }

    if sender.daily_higher_tier_limit == UNLIMITED {
        return Ok(Decision::ALLOWED);
    }

    if sender.higher_tier_conversations_today < sender.daily_higher_tier_limit {
        return Ok(Decision::ALLOWED);
    }

    tracing::debug!(
        sender = sender_id,
        recipient = recipient_id,
        used = sender.higher_tier_conversations_today,
        limit = sender.daily_higher_tier_limit,
        "daily limit reached"
    );
    Ok(Decision::denied(DenyReason::DailyLimitReached))
}
