use sqlx::SqlitePool;

// Keys are TEXT throughout: user ids come from the identity provider,
// everything else is a uuid rendered to a string.
//
// reputations.last_conversation_date is the YYYY-MM-DD (UTC) day the
// counter applies to; NULL until the user's first counted start. The
// counter columns are only ever written by field-level updates, never by
// whole-row overwrites, so tier recalculations and counter bumps can't
// clobber each other.
const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        handle TEXT NOT NULL,
        alias TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reputations (
        user_id TEXT PRIMARY KEY,
        tier TEXT NOT NULL DEFAULT 'new',
        score INTEGER NOT NULL DEFAULT 0,
        higher_tier_conversations_today INTEGER NOT NULL DEFAULT 0,
        last_conversation_date TEXT
    )",
    "CREATE TABLE IF NOT EXISTS conversations (
        uuid TEXT PRIMARY KEY,
        user_a TEXT NOT NULL,
        user_b TEXT NOT NULL,
        UNIQUE (user_a, user_b)
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL,
        sender_id TEXT NOT NULL,
        content TEXT NOT NULL,
        sent_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages (conversation_id)",
];

pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in TABLES {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
