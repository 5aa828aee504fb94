use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::config::ProxyKind;
use crate::framework::Deployment;
use crate::types::DeployableUnitName;

pub mod contract_deployment;

/// Record of a single run, written next to the deployment on request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub unit: DeployableUnitName,
    pub proxy_kind: ProxyKind,
    pub chain_id: u64,
    pub deployer: Address,

    #[serde(default)]
    pub deployment: Option<Deployment>,
}

impl DeploymentReport {
    pub fn new(
        unit: DeployableUnitName,
        proxy_kind: ProxyKind,
        chain_id: u64,
        deployer: Address,
    ) -> Self {
        Self {
            unit,
            proxy_kind,
            chain_id,
            deployer,
            deployment: None,
        }
    }

    pub fn with_deployment(mut self, deployment: Deployment) -> Self {
        self.deployment = Some(deployment);
        self
    }
}
