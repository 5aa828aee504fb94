use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ethers::prelude::*;
use reqwest::Url;

use crate::cli::PrivateKey;
use crate::forge_utils::{ContractSpec, ForgeCreate};

pub type RpcSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Debug)]
pub struct DeploymentContext {
    pub contracts_dir: PathBuf,
    pub chain_id: u64,
    pub deployer: Address,
    pub nonce: AtomicU64,
    pub private_key: PrivateKey,
    pub rpc_url: Url,
    pub rpc_signer: Arc<RpcSigner>,
    pub etherscan_api_key: Option<String>,
}

impl DeploymentContext {
    pub fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    pub fn forge_create(&self, contract_spec: ContractSpec) -> ForgeCreate {
        let mut forge_create = ForgeCreate::new(contract_spec)
            .with_cwd(&self.contracts_dir)
            .with_private_key(self.private_key.clone())
            .with_rpc_url(self.rpc_url.to_string())
            .with_override_nonce(self.next_nonce());

        if let Some(etherscan_api_key) = self.etherscan_api_key.as_ref() {
            forge_create = forge_create
                .with_verification_api_key(etherscan_api_key.clone());
        }

        forge_create
    }
}
