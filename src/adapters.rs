use std::time::Duration;

use time::OffsetDateTime;

use crate::ports;

mod console;
mod http;
mod storage;

pub use console::{
    ConsoleInput, ConsolePlatform, DeviceProfile, PlatformError, PromptMode, StoredSubscription,
    stdin_input,
};
pub use http::{BackendError, HttpBackend};
pub use storage::{JsonFileStorage, StorageError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, interval: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(interval)
    }
}
