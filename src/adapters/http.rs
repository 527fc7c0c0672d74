use serde::Serialize;
use serde::de::DeserializeOwned;

use std::pin::Pin;
use std::time::Duration;

use crate::ports::ModeBackend;
use crate::types::{
    ModeState, Notification, NotificationResponse, NotifyRequest, PushSubscription, StateUpdate,
    StatesResponse,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to build http client: {0}")]
    ClientBuild(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned {status} for {path}")]
    Status {
        status: reqwest::StatusCode,
        path: &'static str,
    },
}

/// REST client for the mode-sync worker. No credentials are sent.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Every request is bounded by `timeout` so a hung call cannot stall
    /// the polling loop.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .build()
            .map_err(|err| BackendError::ClientBuild(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, BackendError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status { status, path });
        }
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &'static str,
        body: &B,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status { status, path });
        }
        Ok(())
    }
}

impl ModeBackend for HttpBackend {
    type Error = BackendError;
    type Fut<'a, T>
        = Pin<Box<dyn Future<Output = Result<T, Self::Error>> + Send + 'a>>
    where
        Self: 'a,
        T: Send + 'a;

    fn fetch_states(&self) -> Self::Fut<'_, ModeState> {
        Box::pin(async move {
            let response: StatesResponse = self.get_json("/states", &[]).await?;
            Ok(response.states)
        })
    }

    fn save_state<'a>(&'a self, update: &'a StateUpdate) -> Self::Fut<'a, ()> {
        Box::pin(self.post_json("/state", update))
    }

    fn notify<'a>(&'a self, request: &'a NotifyRequest) -> Self::Fut<'a, ()> {
        Box::pin(self.post_json("/notify", request))
    }

    fn fetch_notification<'a>(&'a self, user: &'a str) -> Self::Fut<'a, Option<Notification>> {
        Box::pin(async move {
            let response: NotificationResponse =
                self.get_json("/notifications", &[("user", user)]).await?;
            Ok(response.notification)
        })
    }

    fn subscribe<'a>(&'a self, subscription: &'a PushSubscription) -> Self::Fut<'a, ()> {
        Box::pin(self.post_json("/subscribe", subscription))
    }
}
