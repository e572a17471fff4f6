use recipebox::{
    app::{build_app, serve},
    auth::session::SessionEvent,
    config::AppConfig,
    state::AppState,
};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipebox=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let address = config.server_address();
    let (state, pg) = AppState::init(config).await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(pg.pool()).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let mut events = state.sessions.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedIn { user_id, session_id }) => {
                    tracing::info!(%user_id, %session_id, "session started")
                }
                Ok(SessionEvent::SignedOut { user_id, session_id }) => {
                    tracing::info!(%user_id, %session_id, "session ended")
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session event listener lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    serve(build_app(state), &address).await
}
