use tokio::io::AsyncReadExt;

use crate::adapters::{
    BackendError, ConsolePlatform, HttpBackend, JsonFileStorage, PromptMode, TokioTimeProvider,
    stdin_input,
};
use crate::config::ClientConfig;
use crate::push::{DeliveryWorker, NotificationGateway};
use crate::session;
use crate::store::LocalModeStore;
use crate::sync::{SyncClient, spawn_polling};
use crate::types::Mode;

pub type DeviceClient =
    SyncClient<HttpBackend, JsonFileStorage, ConsolePlatform, TokioTimeProvider>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Session,
    Watch,
    Status,
    Toggle(Mode),
    Notify(Mode),
    EnableNotifications,
    PushEvent { payload: Option<String> },
}

pub fn platform(config: &ClientConfig, prompt: PromptMode) -> ConsolePlatform {
    ConsolePlatform::open(
        config.device_path(),
        config.notifications_supported,
        config.push_endpoint.clone(),
        prompt,
    )
}

pub fn build_client(
    config: &ClientConfig,
    prompt: PromptMode,
) -> Result<DeviceClient, BackendError> {
    let backend = HttpBackend::new(&config.api_url, config.request_timeout)?;
    let store = LocalModeStore::open(JsonFileStorage::new(config.modes_path()));
    let gateway = NotificationGateway::new(
        platform(config, prompt),
        config.vapid_public_key.clone(),
    );
    Ok(SyncClient::new(
        backend,
        store,
        gateway,
        TokioTimeProvider,
        config.user.clone(),
        config.poll_interval,
    ))
}

pub async fn run(config: ClientConfig, action: Action) -> i32 {
    tracing::info!(user = %config.user, api_url = %config.api_url, ?action, "starting modesync");
    match action {
        Action::Session => session::run(&config).await,
        Action::Watch => watch(&config).await,
        Action::Status => status(&config).await,
        Action::Toggle(mode) => toggle(&config, mode).await,
        Action::Notify(mode) => notify(&config, mode).await,
        Action::EnableNotifications => enable_notifications(&config).await,
        Action::PushEvent { payload } => push_event(&config, payload).await,
    }
}

fn open_client(config: &ClientConfig, prompt: PromptMode) -> Option<DeviceClient> {
    match build_client(config, prompt) {
        Ok(client) => Some(client),
        Err(err) => {
            tracing::error!(error = %err, "failed to set up backend client");
            None
        }
    }
}

async fn watch(config: &ClientConfig) -> i32 {
    let Some(mut client) = open_client(config, PromptMode::Decline) else {
        return 1;
    };
    client.init().await;
    let handle = spawn_polling(client);
    tracing::info!(started_at = %handle.started_at(), "polling for updates");
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
    handle.abort();
    0
}

async fn status(config: &ClientConfig) -> i32 {
    let Some(mut client) = open_client(config, PromptMode::Decline) else {
        return 1;
    };
    let fetched = client.fetch_state().await;
    println!("{}", session::render_state(client.state()));
    if fetched { 0 } else { 1 }
}

async fn toggle(config: &ClientConfig, mode: Mode) -> i32 {
    let Some(mut client) = open_client(config, PromptMode::Decline) else {
        return 1;
    };
    client.fetch_state().await;
    let value = client.toggle(mode).await;
    println!("{} is now {}", mode.display_name(), session::on_off(value));
    0
}

async fn notify(config: &ClientConfig, mode: Mode) -> i32 {
    let Some(mut client) = open_client(config, PromptMode::Ask(stdin_input())) else {
        return 1;
    };
    client.init().await;
    if client.send_notification(mode).await { 0 } else { 1 }
}

async fn enable_notifications(config: &ClientConfig) -> i32 {
    let Some(mut client) = open_client(config, PromptMode::Ask(stdin_input())) else {
        return 1;
    };
    client.init().await;
    if client.enable_notifications().await { 0 } else { 1 }
}

async fn push_event(config: &ClientConfig, payload: Option<String>) -> i32 {
    let data = match payload {
        Some(payload) => payload.into_bytes(),
        None => {
            let mut data = Vec::new();
            if let Err(err) = tokio::io::stdin().read_to_end(&mut data).await {
                tracing::error!(error = %err, "failed to read push payload");
                return 1;
            }
            data
        }
    };
    let worker = DeliveryWorker::new(platform(config, PromptMode::Decline));
    worker.install();
    worker.activate();
    let data = (!data.is_empty()).then_some(data.as_slice());
    match worker.handle_push(data).await {
        Ok(_) => 0,
        Err(err) => {
            tracing::error!(error = %err, "failed to render push notification");
            1
        }
    }
}
