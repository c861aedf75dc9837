use sqlx::SqliteConnection;

use crate::{reputation::store, AppResult};

/// Conversation-start accounting, run when the first message of a
/// conversation is persisted. The start costs a daily slot only when the
/// recipient outranks the sender at that moment; same- or lower-tier
/// starts leave the counter alone. Once per conversation by construction:
/// only the first message reaches here.
pub(crate) async fn on_first_message(
    conn: &mut SqliteConnection,
    sender_id: &str,
    recipient_id: &str,
    today: &str,
) -> AppResult<()> {
    let sender = store::load(&mut *conn, sender_id, today).await?;
    let recipient = store::load(&mut *conn, recipient_id, today).await?;

    if recipient.tier <= sender.tier {
        return Ok(());
    }

    let count = store::record_higher_tier_start(&mut *conn, sender_id, today).await?;
    tracing::debug!(
        sender = sender_id,
        recipient = recipient_id,
        count,
        limit = sender.daily_higher_tier_limit,
        "counted higher-tier conversation start"
    );
    Ok(())
}
