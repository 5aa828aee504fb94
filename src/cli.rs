use std::path::PathBuf;

use clap::Parser;

pub mod private_key;

pub use private_key::PrivateKey;
use reqwest::Url;

use crate::config::{Config, ProxyKind};
use crate::types::DeployableUnitName;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    /// Private key to use for the deployment
    #[clap(short, long, env)]
    pub private_key: PrivateKey,

    /// The RPC Url to use for the deployment
    #[clap(short, long, env)]
    pub rpc_url: Url,

    /// Name of the contract to deploy behind the proxy
    ///
    /// Overrides the unit from the config file
    #[clap(short, long, env = "DEPLOY_UNIT")]
    pub unit: Option<DeployableUnitName>,

    /// Path to the deployment configuration file
    #[clap(short, long, env = "DEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kind of proxy to deploy
    ///
    /// Overrides the proxy kind from the config file
    #[clap(long, env)]
    pub proxy_kind: Option<ProxyKind>,

    /// Foundry project to run forge in
    #[clap(long, env, default_value = ".")]
    pub contracts_dir: PathBuf,

    /// The etherscan API key to use
    #[clap(short, long, env)]
    pub etherscan_api_key: Option<String>,

    /// Where to write the deployment report
    #[clap(long, env = "DEPLOY_REPORT")]
    pub report: Option<PathBuf>,
}

impl Args {
    /// Applies the command line overrides on top of the config file
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(unit) = self.unit.as_ref() {
            config.unit = unit.clone();
        }

        if let Some(proxy_kind) = self.proxy_kind {
            config.proxy.kind = proxy_kind;
        }

        config
    }
}
