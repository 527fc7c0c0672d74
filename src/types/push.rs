use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Browser-shaped push subscription, as produced by `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRegistration {
    pub scope: String,
    pub registered_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

/// Body of a push message delivered to the background worker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub mode: Option<String>,
}
