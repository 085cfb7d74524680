mod config;
mod error;
mod inflight;
mod llm;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use crate::llm::LlmGenerate;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env();

    // Initialize LLM client (non-fatal: AI routes answer 503 if config missing).
    let llm: Option<Arc<dyn LlmGenerate>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; AI features disabled");
            None
        }
    };

    let kv = store::FileKvStore::open(&config.data_dir)
        .await
        .expect("data directory init failed");
    tracing::info!(data_dir = %kv.dir().display(), "history store opened");
    let history = services::history::HistoryStore::load(Arc::new(kv)).await;
    tracing::info!(items = history.len().await, "history ready");

    let state = state::AppState::new(llm, history, config.image);
    let app = routes::app(state, &config.web_dir);

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, web_dir = %config.web_dir.display(), "sellitfast listening");
    axum::serve(listener, app).await.expect("server failed");
}
