use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use ethers::prelude::SignerMiddleware;
use ethers::providers::{Middleware, Provider};
use ethers::signers::{Signer, Wallet};
use ethers::types::BlockNumber;
use eyre::Context;
use tracing::{info, instrument};

use crate::cli::Args;
use crate::config::Config;
use crate::framework::forge::{ForgeFactoryResolver, ForgeProxyDeployer};
use crate::report::DeploymentReport;
use crate::runner::{DeploymentRunner, ExitOutcome};
use crate::serde_utils;
use crate::types::DeployableUnitName;

pub mod deployment_context;

pub use self::deployment_context::DeploymentContext;

pub type ForgeRunner = DeploymentRunner<ForgeFactoryResolver, ForgeProxyDeployer>;

/// Runs a single proxy deployment, setup failures included in the outcome
pub async fn run_deployment(args: Args) -> ExitOutcome {
    match prepare_deployment(args).await {
        Ok((runner, unit)) => runner.run(&unit).await,
        Err(err) => ExitOutcome::Failure(err),
    }
}

#[instrument(skip_all)]
async fn prepare_deployment(
    args: Args,
) -> eyre::Result<(ForgeRunner, DeployableUnitName)> {
    let config: Config = if let Some(path) = args.config.as_ref() {
        serde_utils::read_deserialize(path).await?
    } else {
        Config::default()
    };

    let config = args.apply_overrides(config);

    let provider = Provider::try_from(args.rpc_url.as_str())?;
    let chain_id = provider
        .get_chainid()
        .await
        .with_context(|| format!("Fetching chain id from {}", args.rpc_url))?
        .as_u64();

    let wallet =
        Wallet::from(args.private_key.key.clone()).with_chain_id(chain_id);

    let deployer = wallet.address();

    let signer = SignerMiddleware::new(provider, wallet);

    let nonce = signer
        .get_transaction_count(deployer, Some(BlockNumber::Pending.into()))
        .await
        .context("Fetching deployer nonce")?;

    info!(chain_id, ?deployer, %nonce, unit = %config.unit, kind = %config.proxy.kind, "Prepared deployment");

    let context = Arc::new(DeploymentContext {
        contracts_dir: args.contracts_dir.clone(),
        chain_id,
        deployer,
        nonce: AtomicU64::new(nonce.as_u64()),
        private_key: args.private_key,
        rpc_url: args.rpc_url,
        rpc_signer: Arc::new(signer),
        etherscan_api_key: args.etherscan_api_key,
    });

    let resolver = ForgeFactoryResolver::new(&context.contracts_dir);
    let deployer =
        ForgeProxyDeployer::new(context.clone(), config.proxy.clone());

    let mut runner = DeploymentRunner::new(resolver, deployer)
        .with_initializer_args(config.proxy.initializer_args.clone());

    if let Some(report_path) = args.report {
        let report = DeploymentReport::new(
            config.unit.clone(),
            config.proxy.kind,
            context.chain_id,
            context.deployer,
        );

        runner = runner.with_report(report, report_path);
    }

    Ok((runner, config.unit))
}
