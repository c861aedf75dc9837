use axum::{routing::get, Router};
use rand::seq::IndexedRandom;
use sqlx::SqlitePool;
use uuid::Uuid;

mod clients;
mod lockin;
mod login;
mod logout;
mod me;

pub use clients::Clients;

use crate::{reputation::store, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/{provider}", get(login::login))
        .route("/lockin/{provider}", get(lockin::lockin))
        .route("/logout", get(logout::logout))
        .route("/me", get(me::me))
}

/// First login. The account row gets a generated identity, and every
/// account starts with its reputation record: tier new, counter zero.
pub(crate) async fn create_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    let handle = "user".to_owned() + &Uuid::now_v7().simple().to_string();
    let adjectives = [
        "Quick", "Lazy", "Mysterious", "Jolly", "Brave", "Silent", "Witty", "Fierce",
        "Clever", "Gentle", "Wild", "Calm", "Bold", "Shy", "Proud", "Happy", "Sad",
        "Eager", "Fancy", "Rusty", "Golden", "Silver", "Bright", "Dark", "Lucky",
    ];

    let nouns = [
        "Fox", "Bear", "Eagle", "Wolf", "Dragon", "Tiger", "Lion", "Owl", "Rabbit",
        "Falcon", "Hawk", "Shark", "Panda", "Kitten", "Puppy", "Phoenix", "Griffin",
        "Unicorn", "Turtle", "Dolphin", "Whale", "Elephant", "Giraffe", "Zebra",
    ];

    let alias = format!(
        "{} {}",
        adjectives.choose(&mut rand::rng()).unwrap(),
        nouns.choose(&mut rand::rng()).unwrap()
    );

    tracing::info!("adding @{handle}#{user_id}, {alias}");
    sqlx::query("INSERT INTO users (id,handle,alias) VALUES (?,?,?)")
        .bind(user_id)
        .bind(&handle)
        .bind(&alias)
        .execute(db_pool)
        .await?;
    store::ensure(db_pool, user_id).await?;
    Ok(())
}
