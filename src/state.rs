use std::sync::Arc;

use crate::{
    message::conversation_service::ConversationService,
    websocket::{presence::PresenceRegistry, router::DeliveryRouter},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub presence: PresenceRegistry,
    pub delivery_router: DeliveryRouter,
    pub conversation_service: ConversationService,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
        }
    }
}
