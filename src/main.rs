//! Process bootstrap: config, tracing, database, oracle, HTTP server.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use incubation_concierge::adapters::ai::{GeminiConfig, GeminiOracle};
use incubation_concierge::adapters::http::{app_router, AppState};
use incubation_concierge::adapters::postgres::PostgresConversationStore;
use incubation_concierge::application::{DialogueManager, SupportContact};
use incubation_concierge::config::AppConfig;
use incubation_concierge::domain::dialogue::KnowledgeSource;
use incubation_concierge::ports::ConversationStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with_target(config.server.is_production())
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        model = %config.ai.model,
        "Starting incubation-concierge"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let store = Arc::new(PostgresConversationStore::new(pool));

    // Corpus bootstrap: reuse or create the file-search store, then record
    // what backs the oracle so operators can inspect it.
    let api_key = config
        .ai
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .unwrap_or_default();
    let mut oracle = GeminiOracle::new(
        GeminiConfig::new(api_key)
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_upload_base_url(&config.ai.upload_base_url)
            .with_timeout(config.ai.timeout()),
    );
    let store_name = oracle
        .ensure_corpus_store(&config.ai.store_display_name, &config.ai.corpus_file)
        .await?;
    store
        .upsert_knowledge_source(&KnowledgeSource::pdf(
            &store_name,
            &config.ai.store_display_name,
            &config.ai.corpus_file,
            &config.ai.model,
        ))
        .await?;
    tracing::info!(store = %store_name, "Oracle ready");

    let dialogue = DialogueManager::new(
        Arc::new(oracle),
        store,
        SupportContact {
            email: config.escalation.support_email.clone(),
            phone: config.escalation.support_phone.clone(),
        },
    );

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = app_router(AppState::new(Arc::new(dialogue))).layer(
        ServiceBuilder::new()
            .layer(cors)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            ))),
    );

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
