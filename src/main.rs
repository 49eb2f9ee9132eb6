// Entry point of the Bubble Feed moderation service.
//
// **Architecture Overview:**
// - `core/` = Business logic (filtering, eligibility, toggles, the gateway)
// - `infra/` = Implementations of core traits (SQLite, OpenRouter, JWT, realtime)
// - `web/` = HTTP and WebSocket adapter (axum)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve the router

mod config;
// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

use crate::config::AppConfig;
use crate::core::gateway::ModerationGateway;
use crate::core::moderation::{load_banned_tokens, TextFilterEngine};
use crate::infra::auth::JwtVerifier;
use crate::infra::moderation::OpenRouterClassifier;
use crate::infra::realtime::RealtimeHub;
use crate::infra::social::SqliteRecordStore;
use crate::web::AppState;
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn build_filter(config: &AppConfig) -> anyhow::Result<TextFilterEngine> {
    let mut filter = TextFilterEngine::new();

    if let Some(path) = &config.banned_words_file {
        let extra = load_banned_tokens(path)
            .with_context(|| format!("Failed to read banned words file at {}", path))?;
        tracing::info!(count = extra.len(), path = %path, "Loaded extra banned tokens");
        filter = filter.extend_tokens(extra);
    }

    match &config.openrouter_api_key {
        Some(api_key) => {
            let classifier =
                OpenRouterClassifier::new(api_key.clone(), config.openrouter_model.clone());
            tracing::info!(model = %config.openrouter_model, "Enhanced content classifier enabled");
            filter = filter.with_classifier(Arc::new(classifier), config.classifier_timeout);
        }
        None => {
            tracing::info!("OPENROUTER_API_KEY not set, using deterministic filtering only");
        }
    }

    tracing::info!(
        tokens = filter.banned_tokens().len(),
        classifier = filter.has_classifier(),
        "Text filter ready"
    );
    Ok(filter)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bubble_feed=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let store = SqliteRecordStore::connect(&config.database_url)
        .await
        .context("Failed to initialize SQLite store")?;

    let filter = build_filter(&config)?;
    let hub = Arc::new(RealtimeHub::new());
    let gateway = Arc::new(ModerationGateway::new(store, filter, hub.clone()));

    let state = AppState {
        gateway,
        auth: Arc::new(JwtVerifier::new(&config.jwt_secret)),
        hub,
    };
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Bubble Feed listening");

    axum::serve(listener, app).await?;
    Ok(())
}
