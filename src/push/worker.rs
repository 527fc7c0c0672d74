use crate::ports::NotificationPlatform;
use crate::push::CHANNEL_ID;
use crate::types::{DisplayNotification, PushPayload};

const DEFAULT_TITLE: &str = "New Message";
const DEFAULT_TAG: &str = "default";

/// Background side of the device: renders push payloads without any access
/// to the foreground session's state.
pub struct DeliveryWorker<P> {
    platform: P,
}

impl<P: NotificationPlatform> DeliveryWorker<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn install(&self) {
        tracing::info!("delivery worker installed");
        if let Err(err) = self.platform.ensure_channel(CHANNEL_ID) {
            tracing::warn!(error = %err, channel = CHANNEL_ID, "failed to create notification channel");
        }
    }

    pub fn activate(&self) {
        tracing::info!("delivery worker activated");
    }

    pub async fn handle_push(&self, data: Option<&[u8]>) -> Result<DisplayNotification, P::Error> {
        let notification = parse_push_payload(data);
        let registration = match self.platform.registration() {
            Some(registration) => registration,
            None => self.platform.register_worker().await?,
        };
        self.platform
            .show_notification(&registration, &notification)
            .await?;
        Ok(notification)
    }
}

/// Malformed or partial payloads fall back to a generic notification.
pub fn parse_push_payload(data: Option<&[u8]>) -> DisplayNotification {
    let payload = match data {
        Some(bytes) => serde_json::from_slice::<PushPayload>(bytes).unwrap_or_else(|err| {
            tracing::info!(error = %err, "non-JSON push payload");
            PushPayload::default()
        }),
        None => PushPayload::default(),
    };
    DisplayNotification {
        title: non_empty(payload.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: non_empty(payload.body).unwrap_or_default(),
        tag: non_empty(payload.mode).unwrap_or_else(|| DEFAULT_TAG.to_string()),
        require_interaction: false,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
