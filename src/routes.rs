use crate::{
    message::{
        self,
        message_dto::{PaginatedMessages, SendMessageRequest, UpdateMessageRequest},
        message_models::{Message, MessageResponse, MessageStatus},
    },
    middleware::auth_middleware,
    state::AppState,
    websocket::ws_handler,
};
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        message::message_handlers::send_message,
        message::message_handlers::get_conversation,
        message::message_handlers::update_message,
        message::message_handlers::delete_message,
        message::message_handlers::mark_message_read,
    ),
    components(
        schemas(
            SendMessageRequest,
            UpdateMessageRequest,
            PaginatedMessages,
            Message,
            MessageResponse,
            MessageStatus,
        )
    ),
    tags(
        (name = "messages", description = "Direct messaging endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Protected routes (auth required)
    let message_routes = Router::new()
        .route("/", post(message::send_message))
        .route("/conversation/:other_user_id", get(message::get_conversation))
        .route(
            "/:id",
            put(message::update_message).delete(message::delete_message),
        )
        .route("/:id/read", patch(message::mark_message_read))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/messages", message_routes)
        // the live channel authenticates via its own first signal
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}
