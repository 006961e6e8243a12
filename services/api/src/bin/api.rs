//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DbAdapter, HttpIdentityAdapter, HttpMediaStorageAdapter, OpenAiImageAdapter,
        OpenAiImageEditAdapter, OpenAiTextAdapter, PdfExtractAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        generate_article_handler, generate_blog_title_handler, generate_image_handler,
        get_published_creations_handler, get_user_creations_handler,
        remove_image_background_handler, remove_object_handler, require_caller,
        rest::ApiDoc, review_resume_handler, state::AppState, toggle_like_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use creator_studio_core::{CreationPipeline, PipelineLimits, QuotaPolicy};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await.map_err(ApiError::Database)?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let http_client = reqwest::Client::new();

    let text_adapter = Arc::new(OpenAiTextAdapter::new(
        openai_client.clone(),
        config.text_model.clone(),
    ));
    let image_adapter = Arc::new(OpenAiImageAdapter::new(
        openai_client.clone(),
        config.image_model.clone(),
    ));
    let image_edit_adapter = Arc::new(OpenAiImageEditAdapter::new(
        openai_client.clone(),
        config.image_edit_model.clone(),
    ));
    let identity_adapter = Arc::new(HttpIdentityAdapter::new(
        http_client.clone(),
        config.identity_api_url.clone(),
        config.identity_api_key.clone(),
    ));
    let media_adapter = Arc::new(HttpMediaStorageAdapter::new(
        http_client,
        config.media_upload_url.clone(),
        config.media_upload_preset.clone(),
    ));

    // --- 4. Assemble the Pipeline and Shared AppState ---
    let pipeline = CreationPipeline {
        store: db_adapter,
        identity: identity_adapter,
        text: text_adapter,
        images: image_adapter,
        image_edit: image_edit_adapter,
        media: media_adapter,
        documents: Arc::new(PdfExtractAdapter::new()),
        limits: PipelineLimits {
            quota: QuotaPolicy {
                free_limit: config.free_usage_limit,
            },
            ..PipelineLimits::default()
        },
    };

    let app_state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let ai_routes = Router::new()
        .route("/api/ai/generate-article", post(generate_article_handler))
        .route("/api/ai/generate-blog-title", post(generate_blog_title_handler))
        .route("/api/ai/generate-image", post(generate_image_handler))
        .route(
            "/api/ai/remove-image-background",
            post(remove_image_background_handler),
        )
        .route("/api/ai/remove-object", post(remove_object_handler))
        .route("/api/ai/review-resume", post(review_resume_handler));

    let user_routes = Router::new()
        .route("/api/user/get-user-creations", get(get_user_creations_handler))
        .route(
            "/api/user/get-published-creations",
            get(get_published_creations_handler),
        )
        .route("/api/user/toggle-like-creation", post(toggle_like_handler));

    // Every route requires a resolved caller identity.
    let api_router = Router::new()
        .merge(ai_routes)
        .merge(user_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_caller,
        ))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
