use serde::{Deserialize, Serialize};

use crate::types::modes::{Mode, ModeState};
use crate::types::notification::Notification;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatesResponse {
    pub states: ModeState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub mode: Mode,
    pub value: bool,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub mode: Mode,
    #[serde(rename = "modeName")]
    pub mode_name: String,
    pub from: String,
}

impl NotifyRequest {
    pub fn new(mode: Mode, from: &str) -> Self {
        Self {
            mode,
            mode_name: mode.display_name().to_string(),
            from: from.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationResponse {
    #[serde(default)]
    pub notification: Option<Notification>,
}
