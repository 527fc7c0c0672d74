use crate::ports::ModeStorage;
use crate::types::{Mode, ModeState};

/// In-memory mode flags mirrored to device storage on every change.
///
/// Storage is a best-effort cache: load and save failures are logged and
/// never surface to the caller.
pub struct LocalModeStore<S> {
    state: ModeState,
    storage: S,
}

impl<S: ModeStorage> LocalModeStore<S> {
    pub fn open(storage: S) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => ModeState::default(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable local mode state");
                ModeState::default()
            }
        };
        Self { state, storage }
    }

    pub fn get(&self) -> &ModeState {
        &self.state
    }

    pub fn set(&mut self, mode: Mode, value: bool) {
        self.state.set(mode, value);
        self.persist();
    }

    /// Unknown identifiers are ignored and nothing is written.
    pub fn set_named(&mut self, id: &str, value: bool) -> Option<Mode> {
        let mode = Mode::from_id(id)?;
        self.set(mode, value);
        Some(mode)
    }

    pub fn toggle(&mut self, mode: Mode) -> bool {
        let value = self.state.toggle(mode);
        self.persist();
        value
    }

    pub fn replace(&mut self, state: ModeState) {
        self.state = state;
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.state) {
            tracing::warn!(error = %err, "failed to persist local mode state");
        }
    }
}
