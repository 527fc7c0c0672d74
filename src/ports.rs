pub mod backend;
pub mod platform;
pub mod storage;
pub mod time;

pub use backend::ModeBackend;
pub use platform::NotificationPlatform;
pub use storage::ModeStorage;
pub use time::TimeProvider;
