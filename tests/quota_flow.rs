use icebreaker::{conversations, db, gate, reputation::store, tier::ReputationTier, AppError};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

const TODAY: &str = "2026-08-07";
const TOMORROW: &str = "2026-08-08";

async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init(&pool).await.unwrap();
    pool
}

async fn user(pool: &SqlitePool, id: &str, tier: ReputationTier) {
    bare_user(pool, id).await;
    store::set_tier_score(pool, id, tier, 0).await.unwrap();
}

/// Account row only, no reputation record.
async fn bare_user(pool: &SqlitePool, id: &str) {
    sqlx::query("INSERT INTO users (id,handle,alias) VALUES (?,?,?)")
        .bind(id)
        .bind(format!("user{id}"))
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

async fn check(pool: &SqlitePool, sender: &str, recipient: &str, today: &str) -> gate::Decision {
    let mut conn = pool.acquire().await.unwrap();
    gate::check_permission(&mut conn, sender, recipient, today)
        .await
        .unwrap()
}

async fn counter(pool: &SqlitePool, id: &str, today: &str) -> i64 {
    store::load(pool, id, today)
        .await
        .unwrap()
        .higher_tier_conversations_today
}

#[tokio::test]
async fn same_or_lower_tier_is_never_limited() {
    for sender_tier in ReputationTier::ALL {
        for recipient_tier in ReputationTier::ALL {
            if recipient_tier > sender_tier {
                continue;
            }
            let pool = pool().await;
            user(&pool, "a", sender_tier).await;
            user(&pool, "b", recipient_tier).await;

            // exhaust the counter; the downward path must not consult it
            for _ in 0..20 {
                store::record_higher_tier_start(&pool, "a", TODAY).await.unwrap();
            }

            let d = check(&pool, "a", "b", TODAY).await;
            assert!(d.allowed, "{sender_tier:?} -> {recipient_tier:?} was denied");
            assert_eq!(d.reason, None);
        }
    }
}

#[tokio::test]
async fn each_tier_gets_exactly_its_daily_limit() {
    for sender_tier in [
        ReputationTier::New,
        ReputationTier::Active,
        ReputationTier::Established,
        ReputationTier::Trusted,
    ] {
        let pool = pool().await;
        user(&pool, "sender", sender_tier).await;

        let limit = sender_tier.daily_limit();
        for i in 0..=limit {
            user(&pool, &format!("peer{i}"), ReputationTier::Distinguished).await;
        }

        for i in 0..limit {
            conversations::send(&pool, "sender", &format!("peer{i}"), "hey", TODAY)
                .await
                .unwrap();
        }
        assert_eq!(counter(&pool, "sender", TODAY).await, limit);

        let err = conversations::send(&pool, "sender", &format!("peer{limit}"), "hey", TODAY)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::DailyLimitReached),
            "{sender_tier:?} over-limit send failed with {err:?} instead"
        );
        assert_eq!(counter(&pool, "sender", TODAY).await, limit);
    }
}

#[tokio::test]
async fn distinguished_sender_is_never_denied() {
    let pool = pool().await;
    user(&pool, "star", ReputationTier::Distinguished).await;

    // nothing outranks distinguished, so every send is downward or level;
    // the unlimited flag still has to hold with the counter forced high
    for _ in 0..50 {
        store::record_higher_tier_start(&pool, "star", TODAY).await.unwrap();
    }

    for (i, tier) in ReputationTier::ALL.into_iter().enumerate() {
        let id = format!("peer{i}");
        user(&pool, &id, tier).await;
        let d = check(&pool, "star", &id, TODAY).await;
        assert!(d.allowed, "distinguished -> {tier:?} was denied");
        conversations::send(&pool, "star", &id, "hello", TODAY).await.unwrap();
    }
}

#[tokio::test]
async fn only_the_first_message_counts() {
    let pool = pool().await;
    user(&pool, "a", ReputationTier::New).await;
    user(&pool, "b", ReputationTier::Trusted).await;

    conversations::send(&pool, "a", "b", "hi", TODAY).await.unwrap();
    assert_eq!(counter(&pool, "a", TODAY).await, 1);

    // the thread is started; more traffic in it is uncounted and ungated
    // even though the sender's quota is spent
    for _ in 0..3 {
        conversations::send(&pool, "a", "b", "and another thing", TODAY).await.unwrap();
    }
    conversations::send(&pool, "b", "a", "ok", TODAY).await.unwrap();
    assert_eq!(counter(&pool, "a", TODAY).await, 1);
    assert_eq!(counter(&pool, "b", TODAY).await, 0);

    // but a fresh higher-tier thread is out of quota
    user(&pool, "c", ReputationTier::Trusted).await;
    let err = conversations::send(&pool, "a", "c", "hi", TODAY).await.unwrap_err();
    assert!(matches!(err, AppError::DailyLimitReached));
}

#[tokio::test]
async fn tier_relationship_is_judged_at_first_message_time() {
    let pool = pool().await;
    user(&pool, "a", ReputationTier::New).await;
    user(&pool, "b", ReputationTier::New).await;

    // same tier at start: uncounted
    conversations::send(&pool, "a", "b", "hi", TODAY).await.unwrap();
    assert_eq!(counter(&pool, "a", TODAY).await, 0);

    // a later promotion of the recipient never back-charges the thread
    store::set_tier_score(&pool, "b", ReputationTier::Trusted, 800).await.unwrap();
    conversations::send(&pool, "a", "b", "congrats", TODAY).await.unwrap();
    assert_eq!(counter(&pool, "a", TODAY).await, 0);
}

#[tokio::test]
async fn counter_resets_on_new_calendar_day() {
    let pool = pool().await;
    user(&pool, "sender", ReputationTier::Active).await;
    for i in 0..5 {
        user(&pool, &format!("peer{i}"), ReputationTier::Distinguished).await;
    }

    for i in 0..3 {
        conversations::send(&pool, "sender", &format!("peer{i}"), "hey", TODAY)
            .await
            .unwrap();
    }
    assert_eq!(counter(&pool, "sender", TODAY).await, 3);

    let err = conversations::send(&pool, "sender", "peer3", "hey", TODAY)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DailyLimitReached));

    // next day the stale counter reads as zero before any write lands
    assert_eq!(counter(&pool, "sender", TOMORROW).await, 0);
    assert!(check(&pool, "sender", "peer3", TOMORROW).await.allowed);

    conversations::send(&pool, "sender", "peer4", "hey", TOMORROW)
        .await
        .unwrap();
    assert_eq!(counter(&pool, "sender", TOMORROW).await, 1);

    let rep = store::load(&pool, "sender", TOMORROW).await.unwrap();
    assert_eq!(rep.last_conversation_date.as_deref(), Some(TOMORROW));
}

#[tokio::test]
async fn new_sender_scenario() {
    let pool = pool().await;
    user(&pool, "newbie", ReputationTier::New).await;
    user(&pool, "star", ReputationTier::Distinguished).await;
    user(&pool, "vet", ReputationTier::Trusted).await;
    user(&pool, "peer", ReputationTier::New).await;

    // one higher-tier start is the whole allowance
    conversations::send(&pool, "newbie", "star", "hi!", TODAY).await.unwrap();
    assert_eq!(counter(&pool, "newbie", TODAY).await, 1);

    let err = conversations::send(&pool, "newbie", "vet", "hi!", TODAY)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DailyLimitReached));

    // a same-tier peer is still fine and uncounted
    conversations::send(&pool, "newbie", "peer", "hey", TODAY).await.unwrap();
    assert_eq!(counter(&pool, "newbie", TODAY).await, 1);
}

#[tokio::test]
async fn probing_permission_consumes_nothing() {
    let pool = pool().await;
    user(&pool, "a", ReputationTier::New).await;
    user(&pool, "b", ReputationTier::Trusted).await;

    for _ in 0..10 {
        assert!(check(&pool, "a", "b", TODAY).await.allowed);
    }
    assert_eq!(counter(&pool, "a", TODAY).await, 0);
}

#[tokio::test]
async fn racing_first_messages_cannot_oversubscribe() {
    let pool = pool().await;
    user(&pool, "a", ReputationTier::New).await;
    user(&pool, "p1", ReputationTier::Distinguished).await;
    user(&pool, "p2", ReputationTier::Distinguished).await;

    let (r1, r2) = tokio::join!(
        conversations::send(&pool, "a", "p1", "hi", TODAY),
        conversations::send(&pool, "a", "p2", "hi", TODAY),
    );

    let successes = r1.is_ok() as i64 + r2.is_ok() as i64;
    assert_eq!(successes, 1, "exactly one racing start may win the last slot");
    assert_eq!(counter(&pool, "a", TODAY).await, 1);
}

#[tokio::test]
async fn missing_reputation_reads_as_new_tier() {
    let pool = pool().await;
    bare_user(&pool, "ghost").await;
    user(&pool, "star", ReputationTier::Distinguished).await;
    user(&pool, "vet", ReputationTier::Trusted).await;

    let rep = store::load(&pool, "ghost", TODAY).await.unwrap();
    assert_eq!(rep.tier, ReputationTier::New);
    assert_eq!(rep.daily_higher_tier_limit, 1);

    conversations::send(&pool, "ghost", "star", "hi", TODAY).await.unwrap();
    let err = conversations::send(&pool, "ghost", "vet", "hi", TODAY)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DailyLimitReached));
}

#[tokio::test]
async fn denied_start_leaves_no_conversation_behind() {
    let pool = pool().await;
    user(&pool, "a", ReputationTier::New).await;
    user(&pool, "b", ReputationTier::Trusted).await;
    user(&pool, "c", ReputationTier::Trusted).await;

    conversations::send(&pool, "a", "b", "hi", TODAY).await.unwrap();
    let _ = conversations::send(&pool, "a", "c", "hi", TODAY).await.unwrap_err();

    assert!(conversations::find(&pool, "a", "c").await.unwrap().is_none());
    assert!(conversations::find(&pool, "c", "a").await.unwrap().is_none());
}

#[tokio::test]
async fn conversations_are_keyed_by_unordered_pair() {
    let pool = pool().await;
    user(&pool, "a", ReputationTier::Active).await;
    user(&pool, "b", ReputationTier::Active).await;

    let first = conversations::send(&pool, "a", "b", "hi", TODAY).await.unwrap();
    let reply = conversations::send(&pool, "b", "a", "hello", TODAY).await.unwrap();
    assert_eq!(first.conversation_id, reply.conversation_id);

    let found = conversations::find(&pool, "b", "a").await.unwrap();
    assert_eq!(found, Some(first.conversation_id));
    assert_eq!(
        conversations::message_count(&pool, first.conversation_id).await.unwrap(),
        2
    );
}
