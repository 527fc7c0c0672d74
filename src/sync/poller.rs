use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::ports::{ModeBackend, ModeStorage, NotificationPlatform, TimeProvider};
use crate::sync::SyncClient;

/// A polling loop running on its own task. Dropping the handle leaves the
/// loop running; call [`PollHandle::abort`] to stop it.
pub struct PollHandle {
    started_at: OffsetDateTime,
    handle: JoinHandle<()>,
}

impl PollHandle {
    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

pub fn spawn_polling<B, S, P, T>(mut client: SyncClient<B, S, P, T>) -> PollHandle
where
    B: ModeBackend,
    S: ModeStorage,
    P: NotificationPlatform,
    T: TimeProvider,
{
    let started_at = client.time().now();
    let handle = tokio::spawn(async move {
        client.run().await;
    });
    PollHandle { started_at, handle }
}
