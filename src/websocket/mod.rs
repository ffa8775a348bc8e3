pub mod gateway;
pub mod presence;
pub mod router;
pub mod types;

pub use gateway::ws_handler;
pub use presence::{PresenceEntry, PresenceRegistry, WsSender};
pub use router::{DeliveryEvent, DeliveryRouter, Participants};
pub use types::{ClientSignal, WsMessage};
