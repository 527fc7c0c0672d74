use std::time::Duration;

use time::OffsetDateTime;

/// Clock and timer used by the polling loop.
pub trait TimeProvider: Clone + Send + Sync + 'static {
    type Sleep<'a>: Future<Output = ()> + Send + 'a
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime;
    fn sleep<'a>(&'a self, interval: Duration) -> Self::Sleep<'a>;
}
