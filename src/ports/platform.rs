use crate::types::{DisplayNotification, Permission, PushSubscription, WorkerRegistration};

/// Device notification facilities: permission, background worker
/// registration, push subscription and rendering.
pub trait NotificationPlatform: Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a, T>: Future<Output = Result<T, Self::Error>> + Send + 'a
    where
        Self: 'a,
        T: Send + 'a;

    fn supports_notifications(&self) -> bool;

    fn permission(&self) -> Permission;

    /// Asks the user. Only call this from a user action.
    fn request_permission(&self) -> Self::Fut<'_, Permission>;

    fn registration(&self) -> Option<WorkerRegistration>;

    /// Returns the existing registration when one is already active.
    fn register_worker(&self) -> Self::Fut<'_, WorkerRegistration>;

    fn subscribe<'a>(
        &'a self,
        registration: &'a WorkerRegistration,
        application_server_key: &'a str,
    ) -> Self::Fut<'a, PushSubscription>;

    fn show_notification<'a>(
        &'a self,
        registration: &'a WorkerRegistration,
        notification: &'a DisplayNotification,
    ) -> Self::Fut<'a, ()>;

    /// Blocking, user-facing message.
    fn alert(&self, message: &str);

    fn ensure_channel(&self, channel: &str) -> Result<(), Self::Error>;
}
