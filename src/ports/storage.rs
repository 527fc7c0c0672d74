use crate::types::ModeState;

/// Durable device-local copy of the mode flags.
pub trait ModeStorage: Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;

    fn load(&self) -> Result<Option<ModeState>, Self::Error>;
    fn save(&self, state: &ModeState) -> Result<(), Self::Error>;
}
