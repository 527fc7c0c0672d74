use crate::types::{ModeState, Notification, NotifyRequest, PushSubscription, StateUpdate};

/// The shared store both devices talk to.
///
/// Every call is a single request with no retry; callers decide what a
/// failure means.
pub trait ModeBackend: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a, T>: Future<Output = Result<T, Self::Error>> + Send + 'a
    where
        Self: 'a,
        T: Send + 'a;

    /// `GET /states`
    fn fetch_states(&self) -> Self::Fut<'_, ModeState>;

    /// `POST /state`
    fn save_state<'a>(&'a self, update: &'a StateUpdate) -> Self::Fut<'a, ()>;

    /// `POST /notify`
    fn notify<'a>(&'a self, request: &'a NotifyRequest) -> Self::Fut<'a, ()>;

    /// `GET /notifications?user=`
    fn fetch_notification<'a>(&'a self, user: &'a str) -> Self::Fut<'a, Option<Notification>>;

    /// `POST /subscribe`
    fn subscribe<'a>(&'a self, subscription: &'a PushSubscription) -> Self::Fut<'a, ()>;
}
