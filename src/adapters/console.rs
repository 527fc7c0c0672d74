use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::adapters::storage::{StorageError, read_json, write_json};
use crate::ports::NotificationPlatform;
use crate::push::keys::{self, KeyError};
use crate::types::{DisplayNotification, Permission, PushSubscription, WorkerRegistration};

const WORKER_SCOPE: &str = "modesync";

/// Terminal lines shared between the interactive session and permission
/// prompts, so only one reader ever owns stdin.
pub type ConsoleInput = Arc<tokio::sync::Mutex<Lines<BufReader<Stdin>>>>;

pub fn stdin_input() -> ConsoleInput {
    Arc::new(tokio::sync::Mutex::new(
        BufReader::new(tokio::io::stdin()).lines(),
    ))
}

#[derive(Clone)]
pub enum PromptMode {
    Ask(ConsoleInput),
    Accept,
    Decline,
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("notifications are not supported on this device")]
    Unsupported,
    #[error("no push service endpoint configured")]
    NoPushService,
    #[error("subscription rejected: {0}")]
    Key(#[from] KeyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to read answer: {0}")]
    Input(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSubscription {
    pub application_server_key: String,
    pub private_key: String,
    pub subscription: PushSubscription,
}

/// Everything the device remembers about notifications between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub permission: Permission,
    pub registration: Option<WorkerRegistration>,
    pub subscription: Option<StoredSubscription>,
    pub channels: Vec<String>,
}

pub struct ConsolePlatform {
    profile_path: PathBuf,
    supported: bool,
    push_endpoint: Option<String>,
    prompt: PromptMode,
    profile: Mutex<DeviceProfile>,
    shown: Mutex<HashMap<String, DisplayNotification>>,
}

impl ConsolePlatform {
    pub fn open(
        profile_path: impl Into<PathBuf>,
        supported: bool,
        push_endpoint: Option<String>,
        prompt: PromptMode,
    ) -> Self {
        let profile_path = profile_path.into();
        let profile = match read_json::<DeviceProfile>(&profile_path) {
            Ok(profile) => profile.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable device profile");
                DeviceProfile::default()
            }
        };
        Self {
            profile_path,
            supported,
            push_endpoint,
            prompt,
            profile: Mutex::new(profile),
            shown: Mutex::new(HashMap::new()),
        }
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile.lock().expect("device profile lock").clone()
    }

    /// Last notification rendered under `tag`.
    pub fn displayed(&self, tag: &str) -> Option<DisplayNotification> {
        self.shown.lock().expect("shown lock").get(tag).cloned()
    }

    fn update_profile<T>(
        &self,
        update: impl FnOnce(&mut DeviceProfile) -> T,
    ) -> Result<T, PlatformError> {
        let mut profile = self.profile.lock().expect("device profile lock");
        let result = update(&mut profile);
        write_json(&self.profile_path, &*profile)?;
        Ok(result)
    }

    async fn ask(&self) -> Result<Permission, PlatformError> {
        let input = match &self.prompt {
            PromptMode::Accept => return Ok(Permission::Granted),
            PromptMode::Decline => return Ok(Permission::Denied),
            PromptMode::Ask(input) => input,
        };
        eprint!("Allow modesync to show notifications? [y/N] ");
        let answer = input.lock().await.next_line().await?;
        Ok(match answer.as_deref().map(str::trim) {
            Some(answer) if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") => {
                Permission::Granted
            }
            Some(_) => Permission::Denied,
            None => Permission::Default,
        })
    }

    fn create_subscription(
        &self,
        application_server_key: &str,
    ) -> Result<PushSubscription, PlatformError> {
        if !self.supported {
            return Err(PlatformError::Unsupported);
        }
        keys::decode_application_server_key(application_server_key)?;
        let endpoint = self
            .push_endpoint
            .clone()
            .ok_or(PlatformError::NoPushService)?;

        if let Some(stored) = self.profile().subscription
            && stored.application_server_key == application_server_key
        {
            return Ok(stored.subscription);
        }

        let material = keys::generate_subscription_keys()?;
        let subscription = PushSubscription {
            endpoint,
            expiration_time: None,
            keys: material.keys,
        };
        self.update_profile(|profile| {
            profile.subscription = Some(StoredSubscription {
                application_server_key: application_server_key.to_string(),
                private_key: material.private_key,
                subscription: subscription.clone(),
            });
        })?;
        Ok(subscription)
    }

    fn render(&self, notification: &DisplayNotification) {
        let replaced = self
            .shown
            .lock()
            .expect("shown lock")
            .insert(notification.tag.clone(), notification.clone())
            .is_some();
        if replaced {
            tracing::debug!(tag = %notification.tag, "replacing earlier notification");
        }
        if notification.body.is_empty() {
            println!("[{}] {}", notification.tag, notification.title);
        } else {
            println!(
                "[{}] {}: {}",
                notification.tag, notification.title, notification.body
            );
        }
    }
}

impl NotificationPlatform for ConsolePlatform {
    type Error = PlatformError;
    type Fut<'a, T>
        = Pin<Box<dyn Future<Output = Result<T, Self::Error>> + Send + 'a>>
    where
        Self: 'a,
        T: Send + 'a;

    fn supports_notifications(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> Permission {
        self.profile.lock().expect("device profile lock").permission
    }

    fn request_permission(&self) -> Self::Fut<'_, Permission> {
        Box::pin(async move {
            if !self.supported {
                return Err(PlatformError::Unsupported);
            }
            let current = self.permission();
            if current != Permission::Default {
                return Ok(current);
            }
            let decision = self.ask().await?;
            if decision != Permission::Default {
                self.update_profile(|profile| profile.permission = decision)?;
            }
            Ok(decision)
        })
    }

    fn registration(&self) -> Option<WorkerRegistration> {
        self.profile
            .lock()
            .expect("device profile lock")
            .registration
            .clone()
    }

    fn register_worker(&self) -> Self::Fut<'_, WorkerRegistration> {
        let result = if let Some(registration) = self.registration() {
            Ok(registration)
        } else {
            self.update_profile(|profile| {
                let registration = WorkerRegistration {
                    scope: WORKER_SCOPE.to_string(),
                    registered_at: OffsetDateTime::now_utc(),
                };
                profile.registration = Some(registration.clone());
                registration
            })
        };
        Box::pin(std::future::ready(result))
    }

    fn subscribe<'a>(
        &'a self,
        _registration: &'a WorkerRegistration,
        application_server_key: &'a str,
    ) -> Self::Fut<'a, PushSubscription> {
        Box::pin(std::future::ready(
            self.create_subscription(application_server_key),
        ))
    }

    fn show_notification<'a>(
        &'a self,
        _registration: &'a WorkerRegistration,
        notification: &'a DisplayNotification,
    ) -> Self::Fut<'a, ()> {
        self.render(notification);
        Box::pin(std::future::ready(Ok(())))
    }

    fn alert(&self, message: &str) {
        eprintln!("alert: {message}");
    }

    fn ensure_channel(&self, channel: &str) -> Result<(), Self::Error> {
        let known = self
            .profile
            .lock()
            .expect("device profile lock")
            .channels
            .iter()
            .any(|existing| existing == channel);
        if known {
            return Ok(());
        }
        self.update_profile(|profile| profile.channels.push(channel.to_string()))
    }
}
