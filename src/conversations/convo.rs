use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::AppResult;

/// Participants are stored sorted, so a conversation is keyed by the
/// unordered pair and `find(a, b) == find(b, a)`.
pub fn pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

pub async fn find(db: impl SqliteExecutor<'_>, a: &str, b: &str) -> AppResult<Option<Uuid>> {
    let (user_a, user_b) = pair(a, b);
    let row: Option<(String,)> =
        sqlx::query_as("SELECT uuid FROM conversations WHERE user_a=? AND user_b=?")
            .bind(user_a)
            .bind(user_b)
            .fetch_optional(db)
            .await?;

    Ok(match row {
        Some((uuid,)) => Some(Uuid::parse_str(&uuid)?),
        None => None,
    })
}

pub async fn create(db: impl SqliteExecutor<'_>, a: &str, b: &str) -> AppResult<Uuid> {
    let (user_a, user_b) = pair(a, b);
    let uuid = Uuid::now_v7();
    sqlx::query("INSERT INTO conversations (uuid,user_a,user_b) VALUES (?,?,?)")
        .bind(uuid.to_string())
        .bind(user_a)
        .bind(user_b)
        .execute(db)
        .await?;
    Ok(uuid)
}

pub async fn message_count(db: impl SqliteExecutor<'_>, conversation_id: Uuid) -> AppResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id=?")
        .bind(conversation_id.to_string())
        .fetch_one(db)
        .await?;
    Ok(n)
}
