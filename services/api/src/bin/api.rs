//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{OpenAiQaAdapter, OpenAiSummaryAdapter},
    config::Config,
    error::ApiError,
    web::{
        ask_question_handler, get_session_handler, reset_session_handler, rest::ApiDoc,
        state::AppState, upload_document_handler, ws_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use docqa_core::{QaOrchestrator, SessionController};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(config.require_openai_api_key()?);
    let openai_client = Client::with_config(openai_config);

    let summary_adapter = Arc::new(OpenAiSummaryAdapter::new(
        openai_client.clone(),
        config.summary_model.clone(),
    ));
    let qa_adapter = Arc::new(OpenAiQaAdapter::new(
        openai_client.clone(),
        config.qa_model.clone(),
    ));

    // --- 3. Build the Session & Shared AppState ---
    let session = SessionController::new(summary_adapter, QaOrchestrator::new(qa_adapter));
    let app_state = Arc::new(AppState {
        session: Arc::new(session),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/document", post(upload_document_handler))
        .route(
            "/session",
            get(get_session_handler).delete(reset_session_handler),
        )
        .route("/questions", post(ask_question_handler))
        .route("/events", get(ws_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
