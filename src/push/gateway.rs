use crate::ports::{ModeBackend, NotificationPlatform};
use crate::types::{DisplayNotification, Notification, Permission, PushSubscription};

const MODE_REQUEST_TITLE: &str = "Mode Request";
const CONFIRMATION_TITLE: &str = "Notifications Enabled!";
const CONFIRMATION_BODY: &str = "You will now receive mode requests";
const CONFIRMATION_TAG: &str = "permission-granted";

const UNSUPPORTED_ALERT: &str = "Your device does not support notifications";
const BLOCKED_ALERT: &str = "Notifications are blocked. Please enable them in your device settings.";
const DENIED_ALERT: &str = "Notification permission denied";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("push delivery is not supported on this device")]
    Unsupported,
    #[error("worker registration failed: {0}")]
    Registration(String),
    #[error("push subscription failed: {0}")]
    Subscription(String),
    #[error("failed to hand subscription to backend: {0}")]
    Backend(String),
}

/// Owns the notification permission and push subscription of this device
/// and decides how an incoming notification gets in front of the user.
///
/// Permission moves one way: `default` to `granted` or `denied`. Once denied
/// only the device settings can change it, so the gateway never prompts
/// again and shows guidance instead.
pub struct NotificationGateway<P> {
    platform: P,
    vapid_public_key: Option<String>,
    permission_granted: bool,
}

impl<P: NotificationPlatform> NotificationGateway<P> {
    /// Push registration only happens when a VAPID public key is given.
    pub fn new(platform: P, vapid_public_key: Option<String>) -> Self {
        Self {
            platform,
            vapid_public_key,
            permission_granted: false,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn push_enabled(&self) -> bool {
        self.vapid_public_key.is_some()
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn check_permission_state(&mut self) -> bool {
        if !self.platform.supports_notifications() {
            tracing::info!("this device does not support notifications");
            self.permission_granted = false;
            return false;
        }
        let permission = self.platform.permission();
        tracing::info!(?permission, "current notification permission");
        self.permission_granted = permission == Permission::Granted;
        self.permission_granted
    }

    /// Must run in response to a user action.
    pub async fn request_permission<B: ModeBackend>(&mut self, backend: &B) -> bool {
        if !self.platform.supports_notifications() {
            self.platform.alert(UNSUPPORTED_ALERT);
            return false;
        }
        match self.platform.permission() {
            Permission::Granted => {
                self.permission_granted = true;
                return true;
            }
            Permission::Denied => {
                self.platform.alert(BLOCKED_ALERT);
                return false;
            }
            Permission::Default => {}
        }

        let permission = match self.platform.request_permission().await {
            Ok(permission) => permission,
            Err(err) => {
                tracing::error!(error = %err, "error requesting notification permission");
                self.platform.alert(&format!(
                    "Error requesting notification permission: {err}"
                ));
                return false;
            }
        };
        tracing::info!(?permission, "permission result");
        if permission != Permission::Granted {
            self.platform.alert(DENIED_ALERT);
            return false;
        }

        self.permission_granted = true;
        if let Some(vapid_public_key) = self.vapid_public_key.as_deref()
            && let Err(err) = self.register_push(backend, vapid_public_key).await
        {
            tracing::error!(error = %err, "push registration failed");
        }
        self.show_confirmation().await;
        true
    }

    pub async fn register_push<B: ModeBackend>(
        &self,
        backend: &B,
        vapid_public_key: &str,
    ) -> Result<PushSubscription, GatewayError> {
        if !self.platform.supports_notifications() {
            return Err(GatewayError::Unsupported);
        }
        let registration = self
            .platform
            .register_worker()
            .await
            .map_err(|err| GatewayError::Registration(err.to_string()))?;
        let subscription = self
            .platform
            .subscribe(&registration, vapid_public_key)
            .await
            .map_err(|err| GatewayError::Subscription(err.to_string()))?;
        backend
            .subscribe(&subscription)
            .await
            .map_err(|err| GatewayError::Backend(err.to_string()))?;
        tracing::info!(endpoint = %subscription.endpoint, "push subscription registered");
        Ok(subscription)
    }

    /// Renders through the worker registration, or falls back to an alert
    /// when there is no registration or no permission.
    pub async fn display(&self, notification: &Notification) {
        if !self.platform.supports_notifications() {
            tracing::info!("notifications not supported, using alert");
            self.platform.alert(&notification.message);
            return;
        }
        if self.platform.permission() != Permission::Granted {
            tracing::info!("no notification permission, using alert");
            self.platform.alert(&notification.message);
            return;
        }
        let Some(registration) = self.platform.registration() else {
            self.platform.alert(&notification.message);
            return;
        };
        let rendered = mode_request(notification);
        if let Err(err) = self
            .platform
            .show_notification(&registration, &rendered)
            .await
        {
            tracing::error!(error = %err, "error creating notification");
            self.platform.alert(&notification.message);
        }
    }

    async fn show_confirmation(&self) {
        let Some(registration) = self.platform.registration() else {
            tracing::debug!("no worker registration, skipping confirmation");
            return;
        };
        let confirmation = DisplayNotification {
            title: CONFIRMATION_TITLE.to_string(),
            body: CONFIRMATION_BODY.to_string(),
            tag: CONFIRMATION_TAG.to_string(),
            require_interaction: false,
        };
        if let Err(err) = self
            .platform
            .show_notification(&registration, &confirmation)
            .await
        {
            tracing::warn!(error = %err, "failed to show confirmation notification");
        }
    }
}

pub fn mode_request(notification: &Notification) -> DisplayNotification {
    DisplayNotification {
        title: MODE_REQUEST_TITLE.to_string(),
        body: notification.message.clone(),
        tag: notification.mode.clone(),
        require_interaction: false,
    }
}
