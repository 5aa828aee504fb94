use std::path::{Path, PathBuf};

use eyre::Context;
use tracing::{info, instrument};

use super::common::ContractSpec;
use super::strip_non_json;

pub struct ForgeInspectAbi {
    cwd: Option<PathBuf>,
    contract_spec: ContractSpec,
}

impl ForgeInspectAbi {
    pub fn new(contract_spec: ContractSpec) -> Self {
        Self {
            cwd: None,
            contract_spec,
        }
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_owned());
        self
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("forge");

        cmd.arg("inspect");

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.arg(self.contract_spec.to_string());

        cmd.arg("abi");
        cmd.arg("--json");

        cmd
    }

    #[instrument(name = "forge_inspect_abi", skip_all, fields(contract = %self.contract_spec))]
    pub async fn run(&self) -> eyre::Result<ethers::abi::Abi> {
        let output = self
            .command()
            .output()
            .await
            .context("Spawning forge")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge inspect failed: {}", stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        let abi = serde_json::from_str(strip_non_json(&stdout))
            .context("Parsing forge inspect output")?;

        info!("Resolved abi");

        Ok(abi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_args() {
        let cmd = ForgeInspectAbi::new(ContractSpec::name("AptosExchange"))
            .with_cwd("./contracts")
            .command();

        let args: Vec<_> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args, vec!["inspect", "AptosExchange", "abi", "--json"]);
        assert_eq!(
            cmd.as_std().get_current_dir(),
            Some(Path::new("./contracts"))
        );
    }
}
