mod auth;
mod db;
mod error;
mod message;
mod middleware;
mod routes;
mod state;
mod websocket;

use db::{create_pool, run_migrations};
use message::{conversation_service::ConversationService, message_repository::MessageRepository};
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use websocket::{presence::PresenceRegistry, router::DeliveryRouter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Presence and delivery plumbing
    let presence = PresenceRegistry::new();
    let delivery_router = DeliveryRouter::new(presence.clone());

    let message_repository = MessageRepository::new(db);
    let conversation_service =
        ConversationService::new(message_repository, delivery_router.clone());

    // Create application state
    let state = AppState {
        config,
        presence,
        delivery_router,
        conversation_service,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
