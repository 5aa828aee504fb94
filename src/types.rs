use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

pub const DEFAULT_UNIT: &str = "AptosExchange";

/// Name of the contract that gets deployed behind the proxy
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Shrinkwrap,
)]
#[serde(try_from = "String", into = "String")]
pub struct DeployableUnitName(String);

impl DeployableUnitName {
    pub fn new(name: impl ToString) -> eyre::Result<Self> {
        let name = name.to_string();

        if name.trim().is_empty() {
            eyre::bail!("Deployable unit name must not be empty");
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeployableUnitName {
    fn default() -> Self {
        Self(DEFAULT_UNIT.to_string())
    }
}

impl FromStr for DeployableUnitName {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeployableUnitName {
    type Error = eyre::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeployableUnitName> for String {
    fn from(value: DeployableUnitName) -> Self {
        value.0
    }
}

impl fmt::Display for DeployableUnitName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
