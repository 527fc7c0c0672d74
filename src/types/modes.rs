use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    BestFriends,
    BabyMode,
    RealSelves,
    Lovers,
    Benefits,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::BestFriends,
        Mode::BabyMode,
        Mode::RealSelves,
        Mode::Lovers,
        Mode::Benefits,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::BestFriends => "best-friends",
            Self::BabyMode => "baby-mode",
            Self::RealSelves => "real-selves",
            Self::Lovers => "lovers",
            Self::Benefits => "benefits",
        }
    }

    /// Human-readable name sent to the peer as `modeName`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::BestFriends => "Best Friends",
            Self::BabyMode => "Baby Mode",
            Self::RealSelves => "Real Selves",
            Self::Lovers => "Lovers",
            Self::Benefits => "Benefits",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.id() == id)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Mode identifier to on/off flag.
///
/// A state fetched from the backend replaces the local one wholesale, so a
/// snapshot that omits a mode leaves that mode absent. Absent modes read as
/// off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeState {
    modes: BTreeMap<Mode, bool>,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            modes: Mode::ALL.into_iter().map(|mode| (mode, false)).collect(),
        }
    }
}

impl ModeState {
    pub fn get(&self, mode: Mode) -> Option<bool> {
        self.modes.get(&mode).copied()
    }

    pub fn is_on(&self, mode: Mode) -> bool {
        self.get(mode).unwrap_or(false)
    }

    pub fn set(&mut self, mode: Mode, value: bool) {
        self.modes.insert(mode, value);
    }

    pub fn toggle(&mut self, mode: Mode) -> bool {
        let value = !self.is_on(mode);
        self.set(mode, value);
        value
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.modes.contains_key(&mode)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mode, bool)> + '_ {
        self.modes.iter().map(|(mode, value)| (*mode, *value))
    }
}

impl FromIterator<(Mode, bool)> for ModeState {
    fn from_iter<I: IntoIterator<Item = (Mode, bool)>>(iter: I) -> Self {
        Self {
            modes: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ModeState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.modes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModeState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, value)| Mode::from_id(&id).map(|mode| (mode, value)))
            .collect())
    }
}
