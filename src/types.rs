pub mod api;
pub mod modes;
pub mod notification;
pub mod push;

pub use api::{NotificationResponse, NotifyRequest, StateUpdate, StatesResponse};
pub use modes::{Mode, ModeState};
pub use notification::{DisplayNotification, Notification, NotificationId};
pub use push::{Permission, PushPayload, PushSubscription, SubscriptionKeys, WorkerRegistration};
