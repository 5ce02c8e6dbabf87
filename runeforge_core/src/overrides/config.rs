use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Number of per-socket rune choices kept in the persisted record.
pub const MAX_SOCKETS: usize = 6;

const RECENT_ENCHANTS: usize = 5;

/// User policy for socket, rune and enchant overrides.
///
/// Fields are private: every change goes through [`OverrideConfig::apply`],
/// which keeps uniform and per-socket fill mutually exclusive. The engines
/// read an immutable snapshot per item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideConfig {
    uniform_enabled: bool,
    per_socket_enabled: bool,
    rune_line: String,
    #[serde(deserialize_with = "fixed_socket_choices")]
    per_socket: [String; MAX_SOCKETS],
    pad_sockets: bool,
    enchant_enabled: bool,
    enchant_text: String,
    enchant_id: String,
    enchant_recent: Vec<String>,
    last_bucket_key: String,
}

/// One user interaction against the override policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdate {
    UniformEnabled(bool),
    PerSocketEnabled(bool),
    RuneLine(String),
    SocketRune { index: usize, text: String },
    PadSockets(bool),
    EnchantEnabled(bool),
    SelectEnchant { id: String, text: String },
    ClearEnchant,
    LastBucketKey(String),
}

fn fixed_socket_choices<'de, D>(
    deserializer: D,
) -> std::result::Result<[String; MAX_SOCKETS], D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Vec::<String>::deserialize(deserializer)?;
    let mut slots: [String; MAX_SOCKETS] = Default::default();
    for (slot, text) in slots.iter_mut().zip(stored) {
        *slot = text;
    }
    Ok(slots)
}

impl OverrideConfig {
    /// Build a policy by replaying updates onto the default record.
    pub fn from_updates(updates: impl IntoIterator<Item = ConfigUpdate>) -> Result<Self> {
        let mut cfg = Self::default();
        for update in updates {
            cfg.apply(update)?;
        }
        Ok(cfg)
    }

    /// Apply one update, enforcing uniform/per-socket exclusivity.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<()> {
        debug!("Applying override update: {update:?}");
        match update {
            ConfigUpdate::UniformEnabled(on) => {
                self.uniform_enabled = on;
                if on {
                    self.per_socket_enabled = false;
                }
            }
            ConfigUpdate::PerSocketEnabled(on) => {
                self.per_socket_enabled = on;
                if on {
                    self.uniform_enabled = false;
                }
            }
            ConfigUpdate::RuneLine(text) => self.rune_line = text,
            ConfigUpdate::SocketRune { index, text } => {
                let slot = self
                    .per_socket
                    .get_mut(index)
                    .ok_or(Error::SocketIndexOutOfRange(index))?;
                *slot = text;
            }
            ConfigUpdate::PadSockets(on) => self.pad_sockets = on,
            ConfigUpdate::EnchantEnabled(on) => self.enchant_enabled = on,
            ConfigUpdate::SelectEnchant { id, text } => {
                let text = text.trim().to_string();
                self.enchant_recent.retain(|recent| *recent != text);
                self.enchant_recent.insert(0, text.clone());
                self.enchant_recent.truncate(RECENT_ENCHANTS);
                self.enchant_text = text;
                self.enchant_id = id;
            }
            ConfigUpdate::ClearEnchant => {
                self.enchant_text.clear();
                self.enchant_id.clear();
            }
            ConfigUpdate::LastBucketKey(key) => self.last_bucket_key = key,
        }
        Ok(())
    }

    /// Repair a record loaded from disk that has both fill modes switched on.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.uniform_enabled && self.per_socket_enabled {
            self.per_socket_enabled = false;
        }
        self
    }

    #[must_use]
    pub const fn uniform_enabled(&self) -> bool {
        self.uniform_enabled
    }

    #[must_use]
    pub const fn per_socket_enabled(&self) -> bool {
        self.per_socket_enabled
    }

    #[must_use]
    pub fn rune_line(&self) -> &str {
        &self.rune_line
    }

    #[must_use]
    pub const fn per_socket(&self) -> &[String; MAX_SOCKETS] {
        &self.per_socket
    }

    #[must_use]
    pub const fn pad_sockets(&self) -> bool {
        self.pad_sockets
    }

    #[must_use]
    pub const fn enchant_enabled(&self) -> bool {
        self.enchant_enabled
    }

    #[must_use]
    pub fn enchant_text(&self) -> &str {
        &self.enchant_text
    }

    #[must_use]
    pub fn enchant_id(&self) -> &str {
        &self.enchant_id
    }

    #[must_use]
    pub fn enchant_recent(&self) -> &[String] {
        &self.enchant_recent
    }

    #[must_use]
    pub fn last_bucket_key(&self) -> &str {
        &self.last_bucket_key
    }
}
