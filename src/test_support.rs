//! Hand-written port doubles shared by the unit tests.

use std::future::Ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::oneshot;

use crate::ports::{ModeBackend, NotificationPlatform, TimeProvider};
use crate::types::{
    DisplayNotification, ModeState, Notification, NotificationId, NotifyRequest, Permission,
    PushSubscription, StateUpdate, SubscriptionKeys, WorkerRegistration,
};

#[derive(Debug)]
pub(crate) struct TestError(pub(crate) &'static str);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

pub(crate) fn fixed_now() -> OffsetDateTime {
    OffsetDateTime::parse("2025-01-12T09:30:00Z", &Rfc3339).expect("parse now")
}

pub(crate) fn notification(id: i64, mode: &str, message: &str) -> Notification {
    Notification {
        id: NotificationId::Number(id),
        mode: mode.to_string(),
        message: message.to_string(),
    }
}

/// Backend that keeps only the newest pending notification per poll, like
/// the real worker does.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend {
    pub(crate) states: Arc<Mutex<Option<ModeState>>>,
    pub(crate) pending: Arc<Mutex<Option<Notification>>>,
    pub(crate) saved: Arc<Mutex<Vec<StateUpdate>>>,
    pub(crate) notified: Arc<Mutex<Vec<NotifyRequest>>>,
    pub(crate) subscribed: Arc<Mutex<Vec<PushSubscription>>>,
    pub(crate) polled_users: Arc<Mutex<Vec<String>>>,
    pub(crate) fetches: Arc<Mutex<usize>>,
    pub(crate) offline: Arc<Mutex<bool>>,
}

impl FakeBackend {
    pub(crate) fn with_states(states: ModeState) -> Self {
        let backend = Self::default();
        *backend.states.lock().expect("states lock") = Some(states);
        backend
    }

    pub(crate) fn set_states(&self, states: ModeState) {
        *self.states.lock().expect("states lock") = Some(states);
    }

    pub(crate) fn emit(&self, notification: Notification) {
        *self.pending.lock().expect("pending lock") = Some(notification);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        *self.offline.lock().expect("offline lock") = offline;
    }

    pub(crate) fn fetches(&self) -> usize {
        *self.fetches.lock().expect("fetches lock")
    }

    fn check_online(&self) -> Result<(), TestError> {
        if *self.offline.lock().expect("offline lock") {
            return Err(TestError("backend offline"));
        }
        Ok(())
    }
}

impl ModeBackend for FakeBackend {
    type Error = TestError;
    type Fut<'a, T>
        = Ready<Result<T, Self::Error>>
    where
        Self: 'a,
        T: Send + 'a;

    fn fetch_states(&self) -> Self::Fut<'_, ModeState> {
        *self.fetches.lock().expect("fetches lock") += 1;
        std::future::ready(self.check_online().and_then(|()| {
            self.states
                .lock()
                .expect("states lock")
                .clone()
                .ok_or(TestError("no states"))
        }))
    }

    fn save_state<'a>(&'a self, update: &'a StateUpdate) -> Self::Fut<'a, ()> {
        std::future::ready(self.check_online().map(|()| {
            self.saved.lock().expect("saved lock").push(update.clone());
        }))
    }

    fn notify<'a>(&'a self, request: &'a NotifyRequest) -> Self::Fut<'a, ()> {
        std::future::ready(self.check_online().map(|()| {
            self.notified.lock().expect("notified lock").push(request.clone());
        }))
    }

    fn fetch_notification<'a>(&'a self, user: &'a str) -> Self::Fut<'a, Option<Notification>> {
        self.polled_users
            .lock()
            .expect("polled lock")
            .push(user.to_string());
        std::future::ready(
            self.check_online()
                .map(|()| self.pending.lock().expect("pending lock").clone()),
        )
    }

    fn subscribe<'a>(&'a self, subscription: &'a PushSubscription) -> Self::Fut<'a, ()> {
        std::future::ready(self.check_online().map(|()| {
            self.subscribed
                .lock()
                .expect("subscribed lock")
                .push(subscription.clone());
        }))
    }
}

#[derive(Clone)]
pub(crate) struct FakePlatform {
    pub(crate) supported: bool,
    pub(crate) answer: Permission,
    pub(crate) reject_subscription: bool,
    pub(crate) permission: Arc<Mutex<Permission>>,
    pub(crate) registration: Arc<Mutex<Option<WorkerRegistration>>>,
    pub(crate) shown: Arc<Mutex<Vec<DisplayNotification>>>,
    pub(crate) alerts: Arc<Mutex<Vec<String>>>,
    pub(crate) channels: Arc<Mutex<Vec<String>>>,
    pub(crate) prompts: Arc<Mutex<usize>>,
    pub(crate) registrations: Arc<Mutex<usize>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            supported: true,
            answer: Permission::Granted,
            reject_subscription: false,
            permission: Arc::new(Mutex::new(Permission::Default)),
            registration: Arc::new(Mutex::new(None)),
            shown: Arc::new(Mutex::new(Vec::new())),
            alerts: Arc::new(Mutex::new(Vec::new())),
            channels: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(0)),
            registrations: Arc::new(Mutex::new(0)),
        }
    }
}

impl FakePlatform {
    pub(crate) fn granted_with_worker() -> Self {
        let platform = Self::default();
        *platform.permission.lock().expect("permission lock") = Permission::Granted;
        *platform.registration.lock().expect("registration lock") = Some(registration());
        platform
    }

    pub(crate) fn shown(&self) -> Vec<DisplayNotification> {
        self.shown.lock().expect("shown lock").clone()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.alerts.lock().expect("alerts lock").clone()
    }

    pub(crate) fn prompts(&self) -> usize {
        *self.prompts.lock().expect("prompts lock")
    }
}

pub(crate) fn registration() -> WorkerRegistration {
    WorkerRegistration {
        scope: "modesync".to_string(),
        registered_at: fixed_now(),
    }
}

impl NotificationPlatform for FakePlatform {
    type Error = TestError;
    type Fut<'a, T>
        = Ready<Result<T, Self::Error>>
    where
        Self: 'a,
        T: Send + 'a;

    fn supports_notifications(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> Permission {
        *self.permission.lock().expect("permission lock")
    }

    fn request_permission(&self) -> Self::Fut<'_, Permission> {
        *self.prompts.lock().expect("prompts lock") += 1;
        *self.permission.lock().expect("permission lock") = self.answer;
        std::future::ready(Ok(self.answer))
    }

    fn registration(&self) -> Option<WorkerRegistration> {
        self.registration.lock().expect("registration lock").clone()
    }

    fn register_worker(&self) -> Self::Fut<'_, WorkerRegistration> {
        let mut current = self.registration.lock().expect("registration lock");
        if current.is_none() {
            *self.registrations.lock().expect("registrations lock") += 1;
            *current = Some(registration());
        }
        std::future::ready(Ok(current.clone().expect("registration present")))
    }

    fn subscribe<'a>(
        &'a self,
        _registration: &'a WorkerRegistration,
        application_server_key: &'a str,
    ) -> Self::Fut<'a, PushSubscription> {
        if self.reject_subscription {
            return std::future::ready(Err(TestError("subscription rejected")));
        }
        std::future::ready(Ok(PushSubscription {
            endpoint: format!("https://push.example/{application_server_key}"),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "p256".to_string(),
                auth: "auth".to_string(),
            },
        }))
    }

    fn show_notification<'a>(
        &'a self,
        _registration: &'a WorkerRegistration,
        notification: &'a DisplayNotification,
    ) -> Self::Fut<'a, ()> {
        self.shown
            .lock()
            .expect("shown lock")
            .push(notification.clone());
        std::future::ready(Ok(()))
    }

    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .expect("alerts lock")
            .push(message.to_string());
    }

    fn ensure_channel(&self, channel: &str) -> Result<(), Self::Error> {
        self.channels
            .lock()
            .expect("channels lock")
            .push(channel.to_string());
        Ok(())
    }
}

/// Clock whose sleeps only finish when the test says so.
#[derive(Clone)]
pub(crate) struct TestTime {
    now: OffsetDateTime,
    sleeps: Arc<Mutex<Vec<oneshot::Sender<()>>>>,
    durations: Arc<Mutex<Vec<Duration>>>,
}

impl TestTime {
    pub(crate) fn new(now: OffsetDateTime) -> Self {
        Self {
            now,
            sleeps: Arc::new(Mutex::new(Vec::new())),
            durations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sleep_durations(&self) -> Vec<Duration> {
        self.durations.lock().expect("durations lock").clone()
    }

    pub(crate) fn trigger_all(&self) {
        let mut sends = self.sleeps.lock().expect("sleeps lock");
        for sender in sends.drain(..) {
            let _ = sender.send(());
        }
    }
}

pub(crate) struct ManualSleep {
    receiver: oneshot::Receiver<()>,
}

impl Future for ManualSleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl TimeProvider for TestTime {
    type Sleep<'a>
        = ManualSleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn sleep<'a>(&'a self, interval: Duration) -> Self::Sleep<'a> {
        let (sender, receiver) = oneshot::channel();
        self.durations
            .lock()
            .expect("durations lock")
            .push(interval);
        self.sleeps.lock().expect("sleeps lock").push(sender);
        ManualSleep { receiver }
    }
}
