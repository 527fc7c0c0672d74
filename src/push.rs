mod gateway;
pub(crate) mod keys;
mod worker;

pub use gateway::{GatewayError, NotificationGateway, mode_request};
pub use keys::KeyError;
pub use worker::{DeliveryWorker, parse_push_payload};

/// Notification channel the delivery worker sets up on install.
pub const CHANNEL_ID: &str = "mode-requests";
