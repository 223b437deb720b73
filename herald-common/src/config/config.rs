// See config.toml for information on the variables here.

use serde::Deserialize;

use crate::messages::DefaultMessages;

#[derive(Debug, Clone, Deserialize)]
pub struct HeraldConfig {
    pub prefixes: Prefixes,
    pub dev: DevAttributes,
    #[serde(default)]
    pub messages: DefaultMessages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prefixes {
    /// Prefixes are tried against inbound messages in this exact order.
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevAttributes {
    /// Bot owners: exempt from usability checks and cooldowns, and the only
    /// users that can see hidden or owner-only commands.
    pub owners: Vec<u64>,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            prefixes: Prefixes {
                order: vec!["!".to_owned()],
            },
            dev: DevAttributes { owners: vec![] },
            messages: DefaultMessages::default(),
        }
    }
}
