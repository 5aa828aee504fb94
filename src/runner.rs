use std::io::{self, Write};
use std::path::PathBuf;

use ethers::utils::to_checksum;
use tracing::{info, instrument};

use crate::framework::{Deployment, FactoryResolver, ProxyDeployer};
use crate::report::DeploymentReport;
use crate::serde_utils;
use crate::types::DeployableUnitName;

/// Any error raised while setting up, resolving or deploying
pub type DeploymentError = eyre::Report;

#[derive(Debug)]
pub enum ExitOutcome {
    Success {
        unit: DeployableUnitName,
        deployment: Deployment,
    },
    Failure(DeploymentError),
}

impl ExitOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitOutcome::Success { .. } => 0,
            ExitOutcome::Failure(_) => 1,
        }
    }

    /// Writes the result line on success, the full error report otherwise
    pub fn emit(
        &self,
        stdout: &mut impl Write,
        stderr: &mut impl Write,
    ) -> io::Result<()> {
        match self {
            ExitOutcome::Success { unit, deployment } => {
                writeln!(
                    stdout,
                    "{unit} contract deployed at: {}",
                    to_checksum(&deployment.address(), None)
                )?;
                stdout.flush()
            }
            ExitOutcome::Failure(err) => {
                writeln!(stderr, "{err:?}")?;
                stderr.flush()
            }
        }
    }
}

pub struct DeploymentRunner<R, D> {
    resolver: R,
    deployer: D,
    initializer_args: Vec<String>,
    report: Option<DeploymentReport>,
    report_path: Option<PathBuf>,
}

impl<R, D> DeploymentRunner<R, D>
where
    R: FactoryResolver,
    D: ProxyDeployer<R::Factory>,
{
    pub fn new(resolver: R, deployer: D) -> Self {
        Self {
            resolver,
            deployer,
            initializer_args: vec![],
            report: None,
            report_path: None,
        }
    }

    pub fn with_initializer_args(mut self, args: Vec<String>) -> Self {
        self.initializer_args = args;
        self
    }

    /// Writes `report` with the deployment filled in after a successful run
    pub fn with_report(
        mut self,
        report: DeploymentReport,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.report = Some(report);
        self.report_path = Some(path.into());
        self
    }

    #[instrument(skip_all, fields(%unit))]
    pub async fn run(&self, unit: &DeployableUnitName) -> ExitOutcome {
        match self.deploy(unit).await {
            Ok(deployment) => ExitOutcome::Success {
                unit: unit.clone(),
                deployment,
            },
            Err(err) => ExitOutcome::Failure(err),
        }
    }

    async fn deploy(
        &self,
        unit: &DeployableUnitName,
    ) -> eyre::Result<Deployment> {
        let factory = self.resolver.get_factory(unit).await?;

        info!("Factory resolved");

        let deployment = self
            .deployer
            .deploy_proxy(&factory, &self.initializer_args)
            .await?;

        if let (Some(report), Some(path)) =
            (self.report.as_ref(), self.report_path.as_ref())
        {
            let report = report.clone().with_deployment(deployment.clone());

            serde_utils::write_serialize(path, report).await?;

            info!(path = %path.display(), "Report written");
        }

        Ok(deployment)
    }
}
