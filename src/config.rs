use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::DeployableUnitName;

pub const DEFAULT_INITIALIZER: &str = "initialize";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub unit: DeployableUnitName,

    #[serde(default)]
    pub proxy: ProxyOptions,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
pub enum ProxyKind {
    #[default]
    #[display(fmt = "transparent")]
    Transparent,
    #[display(fmt = "uups")]
    Uups,
}

impl ProxyKind {
    /// The OpenZeppelin proxy contract deployed for this kind
    pub fn default_contract(&self) -> &'static str {
        match self {
            ProxyKind::Transparent => "TransparentUpgradeableProxy",
            ProxyKind::Uups => "ERC1967Proxy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyOptions {
    #[serde(default)]
    pub kind: ProxyKind,

    /// Overrides the proxy contract name
    #[serde(default)]
    pub contract: Option<String>,

    /// Set to null to deploy the proxy without an initializer call
    #[serde(default = "default_initializer")]
    pub initializer: Option<String>,

    #[serde(default)]
    pub initializer_args: Vec<String>,
}

fn default_initializer() -> Option<String> {
    Some(DEFAULT_INITIALIZER.to_string())
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            kind: ProxyKind::default(),
            contract: None,
            initializer: default_initializer(),
            initializer_args: vec![],
        }
    }
}

impl ProxyOptions {
    pub fn proxy_contract(&self) -> &str {
        self.contract
            .as_deref()
            .unwrap_or_else(|| self.kind.default_contract())
    }
}
