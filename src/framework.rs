//! Capabilities of the external deployment framework the runner drives.

use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::report::contract_deployment::ContractDeployment;
use crate::types::DeployableUnitName;

pub mod forge;

/// Maps a unit name to something [`ProxyDeployer`] can deploy.
#[async_trait]
pub trait FactoryResolver: Send + Sync {
    type Factory: Send + Sync;

    async fn get_factory(
        &self,
        unit: &DeployableUnitName,
    ) -> eyre::Result<Self::Factory>;
}

/// Deploys a factory's contract behind an upgradeable proxy.
///
/// `args` are passed to the initializer, not to the implementation's
/// constructor.
#[async_trait]
pub trait ProxyDeployer<F: Send + Sync>: Send + Sync {
    async fn deploy_proxy(
        &self,
        factory: &F,
        args: &[String],
    ) -> eyre::Result<Deployment>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub proxy_deployment: ContractDeployment,
    pub impl_deployment: ContractDeployment,

    /// Only set for transparent proxies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Address>,
}

impl Deployment {
    /// Address users interact with
    pub fn address(&self) -> Address {
        self.proxy_deployment.address
    }
}
