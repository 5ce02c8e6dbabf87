use runeforge_config::Config;
use runeforge_core::ConfigUpdate;
use tracing::info;

/// Input parameters for the Set command strategy.
///
/// Every field maps to one [`ConfigUpdate`]; unset fields leave the policy alone.
#[derive(Debug, Clone, Default)]
pub struct SetInput {
    pub uniform: Option<bool>,
    pub per_socket: Option<bool>,
    pub rune: Option<String>,
    /// `INDEX=TEXT`, index counted from 1
    pub sockets: Vec<String>,
    pub pad: Option<bool>,
    pub enchant: Option<bool>,
    /// `ID=TEXT`
    pub select_enchant: Option<String>,
    pub clear_enchant: bool,
}

impl SetInput {
    /// Translate flags into updates, in a fixed order so that a later
    /// mode flag wins over an earlier one.
    pub fn updates(self) -> anyhow::Result<Vec<ConfigUpdate>> {
        let mut updates = Vec::new();
        if let Some(line) = self.rune {
            updates.push(ConfigUpdate::RuneLine(line));
        }
        for socket in self.sockets {
            let (index, text) = split_pair(&socket, "INDEX=TEXT")?;
            let index: usize = index
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid socket index in {socket:?}"))?;
            if index == 0 {
                anyhow::bail!("Socket indices start at 1: {socket:?}");
            }
            updates.push(ConfigUpdate::SocketRune {
                index: index - 1,
                text,
            });
        }
        if let Some(on) = self.uniform {
            updates.push(ConfigUpdate::UniformEnabled(on));
        }
        if let Some(on) = self.per_socket {
            updates.push(ConfigUpdate::PerSocketEnabled(on));
        }
        if let Some(on) = self.pad {
            updates.push(ConfigUpdate::PadSockets(on));
        }
        if self.clear_enchant {
            updates.push(ConfigUpdate::ClearEnchant);
        }
        if let Some(pair) = self.select_enchant {
            let (id, text) = split_pair(&pair, "ID=TEXT")?;
            updates.push(ConfigUpdate::SelectEnchant {
                id: id.to_string(),
                text,
            });
        }
        if let Some(on) = self.enchant {
            updates.push(ConfigUpdate::EnchantEnabled(on));
        }
        Ok(updates)
    }
}

fn split_pair<'a>(raw: &'a str, shape: &str) -> anyhow::Result<(&'a str, String)> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim().to_string()))
        .ok_or_else(|| anyhow::anyhow!("Expected {shape}, got {raw:?}"))
}

/// Strategy for changing the override policy through its update path.
#[derive(Debug, Clone, Copy)]
pub struct SetStrategy;

impl super::CommandStrategy for SetStrategy {
    type Input = SetInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        let updates = input.updates()?;
        if updates.is_empty() {
            anyhow::bail!("Nothing to set. See 'runeforge set --help'.");
        }

        for update in updates {
            config.overrides.apply(update)?;
        }
        config.save()?;
        info!("Override policy updated");
        println!("✅ Overrides saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_pairs_are_one_based() {
        let input = SetInput {
            sockets: vec!["2 = Glacial Rune".into()],
            per_socket: Some(true),
            ..SetInput::default()
        };
        assert_eq!(
            input.updates().unwrap(),
            [
                ConfigUpdate::SocketRune {
                    index: 1,
                    text: "Glacial Rune".into()
                },
                ConfigUpdate::PerSocketEnabled(true),
            ]
        );
    }

    #[test]
    fn rejects_malformed_pairs() {
        for bad in ["0=Iron Rune", "x=Iron Rune", "Iron Rune"] {
            let input = SetInput {
                sockets: vec![bad.into()],
                ..SetInput::default()
            };
            assert!(input.updates().is_err(), "{bad}");
        }
    }

    #[test]
    fn enchant_selection_precedes_enable() {
        let input = SetInput {
            enchant: Some(true),
            select_enchant: Some("enchant.stat_1=Allocates Inspiration".into()),
            ..SetInput::default()
        };
        assert_eq!(
            input.updates().unwrap(),
            [
                ConfigUpdate::SelectEnchant {
                    id: "enchant.stat_1".into(),
                    text: "Allocates Inspiration".into()
                },
                ConfigUpdate::EnchantEnabled(true),
            ]
        );
    }

    #[test]
    fn out_of_range_socket_fails_at_apply() {
        let input = SetInput {
            sockets: vec!["7=Iron Rune".into()],
            ..SetInput::default()
        };
        let mut overrides = runeforge_core::OverrideConfig::default();
        let result: Result<Vec<()>, _> = input
            .updates()
            .unwrap()
            .into_iter()
            .map(|u| overrides.apply(u))
            .collect();
        assert!(matches!(
            result,
            Err(runeforge_core::Error::SocketIndexOutOfRange(6))
        ));
    }
}
