use std::time::Duration;

use time::OffsetDateTime;

use crate::ports::{ModeBackend, ModeStorage, NotificationPlatform, TimeProvider};
use crate::push::NotificationGateway;
use crate::store::LocalModeStore;
use crate::types::{Mode, ModeState, Notification, NotificationId, NotifyRequest, StateUpdate};

mod poller;

pub use poller::{PollHandle, spawn_polling};

pub type RefreshCallback = Box<dyn FnMut(&ModeState) + Send + Sync>;

/// One device's view of the shared modes.
///
/// The backend is authoritative: every fetch replaces local state wholesale.
/// Local flips are written locally first and then posted without waiting
/// for any acknowledgement.
pub struct SyncClient<B, S, P, T> {
    backend: B,
    store: LocalModeStore<S>,
    gateway: NotificationGateway<P>,
    time: T,
    user: String,
    poll_interval: Duration,
    last_seen_id: Option<NotificationId>,
    synced_at: Option<OffsetDateTime>,
    on_refresh: Option<RefreshCallback>,
}

impl<B, S, P, T> SyncClient<B, S, P, T>
where
    B: ModeBackend,
    S: ModeStorage,
    P: NotificationPlatform,
    T: TimeProvider,
{
    pub fn new(
        backend: B,
        store: LocalModeStore<S>,
        gateway: NotificationGateway<P>,
        time: T,
        user: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            gateway,
            time,
            user: user.into(),
            poll_interval,
            last_seen_id: None,
            synced_at: None,
            on_refresh: None,
        }
    }

    /// Called with the current state after every fetch and local change.
    pub fn with_refresh(
        mut self,
        callback: impl FnMut(&ModeState) + Send + Sync + 'static,
    ) -> Self {
        self.on_refresh = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &ModeState {
        self.store.get()
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn last_seen_id(&self) -> Option<&NotificationId> {
        self.last_seen_id.as_ref()
    }

    pub fn synced_at(&self) -> Option<OffsetDateTime> {
        self.synced_at
    }

    pub fn gateway(&self) -> &NotificationGateway<P> {
        &self.gateway
    }

    pub async fn init(&mut self) {
        self.fetch_state().await;
        self.gateway.check_permission_state();
    }

    pub async fn fetch_state(&mut self) -> bool {
        match self.backend.fetch_states().await {
            Ok(states) => {
                self.store.replace(states);
                self.synced_at = Some(self.time.now());
                self.refresh();
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "error fetching states");
                false
            }
        }
    }

    pub async fn push_state(&self, mode: Mode, value: bool) -> bool {
        let update = StateUpdate {
            mode,
            value,
            user: self.user.clone(),
        };
        match self.backend.save_state(&update).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, %mode, "error saving state");
                false
            }
        }
    }

    pub async fn toggle(&mut self, mode: Mode) -> bool {
        let value = self.store.toggle(mode);
        self.refresh();
        self.push_state(mode, value).await;
        value
    }

    /// Unknown identifiers change nothing and send nothing.
    pub async fn set_named(&mut self, id: &str, value: bool) -> Option<Mode> {
        let mode = self.store.set_named(id, value)?;
        self.refresh();
        self.push_state(mode, value).await;
        Some(mode)
    }

    /// Asks for the peer's attention on `mode`. Runs the permission flow
    /// first when notifications are not yet allowed on this device.
    pub async fn send_notification(&mut self, mode: Mode) -> bool {
        if !self.gateway.permission_granted()
            && !self.gateway.request_permission(&self.backend).await
        {
            return false;
        }
        let request = NotifyRequest::new(mode, &self.user);
        match self.backend.notify(&request).await {
            Ok(()) => {
                tracing::info!(%mode, "notification sent");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, %mode, "error sending notification");
                false
            }
        }
    }

    pub async fn enable_notifications(&mut self) -> bool {
        self.gateway.request_permission(&self.backend).await
    }

    /// Delivers the pending notification unless it was already seen. The
    /// backend keeps only the newest one, so anything older is gone.
    pub async fn poll_notifications(&mut self) -> Option<Notification> {
        let notification = match self.backend.fetch_notification(&self.user).await {
            Ok(notification) => notification?,
            Err(err) => {
                tracing::error!(error = %err, "error checking notifications");
                return None;
            }
        };
        if self.last_seen_id.as_ref() == Some(&notification.id) {
            return None;
        }
        self.last_seen_id = Some(notification.id.clone());
        tracing::info!(id = %notification.id, mode = %notification.mode, "new notification received");
        self.gateway.display(&notification).await;
        Some(notification)
    }

    pub async fn tick(&mut self) {
        self.fetch_state().await;
        self.poll_notifications().await;
    }

    /// Polls forever. Each tick finishes before the next interval starts.
    pub async fn run(&mut self) {
        let time = self.time.clone();
        loop {
            time.sleep(self.poll_interval).await;
            tracing::debug!("poll tick");
            self.tick().await;
        }
    }

    fn refresh(&mut self) {
        if let Some(callback) = self.on_refresh.as_mut() {
            callback(self.store.get());
        }
    }
}
