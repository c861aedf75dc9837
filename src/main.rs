use icebreaker::{auth, conversations, db, reputation, AppState};
use axum::{debug_handler, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "icebreaker=debug,info".into()),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(12)));

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(dotenv::var("DATABASE_URL").unwrap().as_str())
        .await.unwrap();
    db::init(&db_pool).await.unwrap();

    let secret_path = dotenv::var("CLIENT_SECRET_PATH").unwrap_or("client_secret.json".to_owned());
    let clients = match std::fs::read_to_string(&secret_path) {
        Ok(raw) => auth::Clients::from_json(serde_json::from_str(&raw).unwrap()).unwrap(),
        Err(_) => {
            tracing::warn!("no oauth config at {secret_path}, login disabled");
            auth::Clients::disabled()
        }
    };

    let app_state = AppState {
        db_pool,
        clients,
        tx: broadcast::channel(64).0,
    };

    let app = Router::new()
        .route("/", get(health))

        .merge(auth::router())
        .nest("/c", conversations::router())
        .nest("/u", reputation::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::very_permissive());

    let addr = dotenv::var("BIND_ADDR").unwrap_or("0.0.0.0:8080".to_owned());
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    Json(json!({ "service": "icebreaker", "status": "ok" }))
}
