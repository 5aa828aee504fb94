//! Forge backed implementation of the framework capabilities.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::token::{LenientTokenizer, Tokenizer};
use ethers::abi::Abi;
use ethers::providers::Middleware;
use ethers::types::{Address, Bytes};
use eyre::Context as _;
use tracing::{info, instrument};

use super::{Deployment, FactoryResolver, ProxyDeployer};
use crate::config::{ProxyKind, ProxyOptions};
use crate::deployment::DeploymentContext;
use crate::ethers_utils::{read_address_slot, ADMIN_SLOT, IMPLEMENTATION_SLOT};
use crate::forge_utils::{ContractSpec, ForgeCreate, ForgeInspectAbi};
use crate::types::DeployableUnitName;

#[derive(Debug, Clone)]
pub struct ForgeFactory {
    pub spec: ContractSpec,
    pub abi: Abi,
}

pub struct ForgeFactoryResolver {
    contracts_dir: PathBuf,
}

impl ForgeFactoryResolver {
    pub fn new(contracts_dir: impl AsRef<Path>) -> Self {
        Self {
            contracts_dir: contracts_dir.as_ref().to_owned(),
        }
    }
}

#[async_trait]
impl FactoryResolver for ForgeFactoryResolver {
    type Factory = ForgeFactory;

    async fn get_factory(
        &self,
        unit: &DeployableUnitName,
    ) -> eyre::Result<ForgeFactory> {
        let spec = ContractSpec::from_unit(unit);

        let abi = ForgeInspectAbi::new(spec.clone())
            .with_cwd(&self.contracts_dir)
            .run()
            .await
            .with_context(|| format!("Resolving factory for {unit}"))?;

        Ok(ForgeFactory { spec, abi })
    }
}

pub struct ForgeProxyDeployer {
    context: Arc<DeploymentContext>,
    options: ProxyOptions,
}

impl ForgeProxyDeployer {
    pub fn new(context: Arc<DeploymentContext>, options: ProxyOptions) -> Self {
        Self { context, options }
    }

    /// `(logic, data)` for uups, `(logic, initialOwner, data)` for transparent
    fn proxy_create(&self, implementation: Address, call_data: Bytes) -> ForgeCreate {
        let proxy_spec = ContractSpec::name(self.options.proxy_contract());

        let mut proxy_create = self
            .context
            .forge_create(proxy_spec)
            .with_constructor_arg(format!("{implementation:?}"));

        if self.options.kind == ProxyKind::Transparent {
            proxy_create = proxy_create
                .with_constructor_arg(format!("{:?}", self.context.deployer));
        }

        proxy_create.with_constructor_arg(call_data)
    }
}

/// Checks the proxy's implementation slot and reads the admin of
/// transparent proxies
async fn check_proxy<M: Middleware>(
    client: &M,
    kind: ProxyKind,
    proxy: Address,
    implementation: Address,
) -> eyre::Result<Option<Address>>
where
    M::Error: 'static,
{
    let current = read_address_slot(client, proxy, IMPLEMENTATION_SLOT).await?;

    if current != implementation {
        eyre::bail!(
            "Proxy {proxy:?} points to {current:?} instead of the deployed implementation {implementation:?}"
        );
    }

    match kind {
        ProxyKind::Transparent => {
            Ok(Some(read_address_slot(client, proxy, ADMIN_SLOT).await?))
        }
        ProxyKind::Uups => Ok(None),
    }
}

#[async_trait]
impl ProxyDeployer<ForgeFactory> for ForgeProxyDeployer {
    #[instrument(name = "deploy_proxy", skip_all, fields(contract = %factory.spec, kind = %self.options.kind))]
    async fn deploy_proxy(
        &self,
        factory: &ForgeFactory,
        args: &[String],
    ) -> eyre::Result<Deployment> {
        // Encoded up front so bad arguments fail before anything is sent
        let call_data = encode_initializer(
            &factory.abi,
            self.options.initializer.as_deref(),
            args,
        )?;

        let impl_output = self
            .context
            .forge_create(factory.spec.clone())
            .run()
            .await
            .context("Deploying implementation")?;

        let proxy_output = self
            .proxy_create(impl_output.deployed_to, call_data)
            .run()
            .await
            .context("Deploying proxy")?;

        let admin = check_proxy(
            self.context.rpc_signer.as_ref(),
            self.options.kind,
            proxy_output.deployed_to,
            impl_output.deployed_to,
        )
        .await?;

        info!(
            proxy = ?proxy_output.deployed_to,
            implementation = ?impl_output.deployed_to,
            ?admin,
            "Proxy deployed"
        );

        Ok(Deployment {
            proxy_deployment: proxy_output.into(),
            impl_deployment: impl_output.into(),
            admin,
        })
    }
}

/// Builds the data the proxy calls its implementation with on construction.
///
/// A missing initializer is only fine when no arguments were given, in which
/// case the proxy is deployed with empty data.
pub fn encode_initializer(
    abi: &Abi,
    initializer: Option<&str>,
    args: &[String],
) -> eyre::Result<Bytes> {
    let Some(name) = initializer else {
        if !args.is_empty() {
            eyre::bail!(
                "Got {} initializer arguments but the initializer is disabled",
                args.len()
            );
        }

        return Ok(Bytes::new());
    };

    let Some(overloads) = abi.functions.get(name) else {
        if !args.is_empty() {
            eyre::bail!(
                "Got {} initializer arguments but the abi has no `{name}` function",
                args.len()
            );
        }

        return Ok(Bytes::new());
    };

    let candidates: Vec<_> = overloads
        .iter()
        .filter(|func| func.inputs.len() == args.len())
        .collect();

    let func = match candidates.as_slice() {
        [] => eyre::bail!(
            "No `{name}` overload takes {} arguments",
            args.len()
        ),
        [func] => *func,
        _ => eyre::bail!(
            "Ambiguous initializer, `{name}` has several overloads taking {} arguments: {}",
            args.len(),
            candidates
                .iter()
                .map(|func| func.signature())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    let tokens = func
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            LenientTokenizer::tokenize(&param.kind, arg).with_context(|| {
                format!("Parsing `{arg}` as {} for `{}`", param.kind, param.name)
            })
        })
        .collect::<eyre::Result<Vec<_>>>()?;

    let call_data = func.encode_input(&tokens)?;

    Ok(call_data.into())
}

#[cfg(test)]
mod tests {
    use ethers::providers::Provider;
    use indoc::indoc;

    use super::*;
    use crate::deployment::deployment_context::tests::local_context;

    const ABI: &str = indoc! {r#"
        [
          {
            "type": "function",
            "name": "initialize",
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
          },
          {
            "type": "function",
            "name": "initialize",
            "inputs": [
              { "name": "owner", "type": "address", "internalType": "address" },
              { "name": "fee", "type": "uint256", "internalType": "uint256" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
          }
        ]
    "#};

    fn abi() -> Abi {
        serde_json::from_str(ABI).expect("valid abi")
    }

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn no_argument_initializer() -> eyre::Result<()> {
        let data = encode_initializer(&abi(), Some("initialize"), &[])?;

        // initialize()
        assert_eq!(data.to_string(), "0x8129fc1c");

        Ok(())
    }

    #[test]
    fn overload_is_picked_by_argument_count() -> eyre::Result<()> {
        let data = encode_initializer(
            &abi(),
            Some("initialize"),
            &args(&["0x0000000000000000000000000000000000000001", "42"]),
        )?;

        assert_eq!(data.len(), 4 + 32 * 2);
        assert_eq!(data[4 + 31], 0x01);
        assert_eq!(data[4 + 63], 42);

        Ok(())
    }

    #[test]
    fn missing_initializer_without_args_is_empty() -> eyre::Result<()> {
        let data = encode_initializer(&Abi::default(), Some("initialize"), &[])?;
        assert!(data.is_empty());

        let data = encode_initializer(&abi(), None, &[])?;
        assert!(data.is_empty());

        Ok(())
    }

    #[test]
    fn missing_initializer_with_args_fails() {
        let res = encode_initializer(&Abi::default(), Some("initialize"), &args(&["1"]));
        assert!(res.is_err());

        let res = encode_initializer(&abi(), None, &args(&["1"]));
        assert!(res.is_err());
    }

    #[test]
    fn argument_count_mismatch_fails() {
        let res = encode_initializer(&abi(), Some("initialize"), &args(&["1"]));
        assert!(res.is_err());
    }

    #[test]
    fn unparseable_argument_fails() {
        let res = encode_initializer(
            &abi(),
            Some("initialize"),
            &args(&["not-an-address", "42"]),
        );

        let err = res.unwrap_err();
        assert!(format!("{err:?}").contains("not-an-address"));
    }

    #[test]
    fn same_arity_overloads_are_ambiguous() -> eyre::Result<()> {
        let abi: Abi = serde_json::from_str(indoc! {r#"
            [
              {
                "type": "function",
                "name": "initialize",
                "inputs": [{ "name": "owner", "type": "address" }],
                "outputs": [],
                "stateMutability": "nonpayable"
              },
              {
                "type": "function",
                "name": "initialize",
                "inputs": [{ "name": "fee", "type": "uint256" }],
                "outputs": [],
                "stateMutability": "nonpayable"
              }
            ]
        "#})?;

        let err = encode_initializer(
            &abi,
            Some("initialize"),
            &args(&["0x0000000000000000000000000000000000000001"]),
        )
        .unwrap_err();

        let message = format!("{err:?}");
        assert!(message.contains("initialize(address)"));
        assert!(message.contains("initialize(uint256)"));

        Ok(())
    }

    fn constructor_args(create: &ForgeCreate) -> Vec<String> {
        create
            .args()
            .into_iter()
            .skip_while(|a| a != "--constructor-args")
            .skip(1)
            .collect()
    }

    #[test]
    fn uups_proxy_takes_logic_and_data() -> eyre::Result<()> {
        let context = Arc::new(local_context(0)?);
        let options = ProxyOptions {
            kind: ProxyKind::Uups,
            ..Default::default()
        };
        let deployer = ForgeProxyDeployer::new(context, options);

        let implementation = Address::from_low_u64_be(0xabc);
        let create = deployer.proxy_create(
            implementation,
            Bytes::from(vec![0x81, 0x29, 0xfc, 0x1c]),
        );

        assert_eq!(create.args()[1], "ERC1967Proxy");
        assert_eq!(
            constructor_args(&create),
            vec![format!("{implementation:?}"), "0x8129fc1c".to_string()]
        );

        Ok(())
    }

    #[test]
    fn transparent_proxy_is_owned_by_the_deployer() -> eyre::Result<()> {
        let context = Arc::new(local_context(0)?);
        let owner = context.deployer;
        let deployer =
            ForgeProxyDeployer::new(context, ProxyOptions::default());

        let implementation = Address::from_low_u64_be(0xabc);
        let create = deployer.proxy_create(implementation, Bytes::new());

        assert_eq!(create.args()[1], "TransparentUpgradeableProxy");
        assert_eq!(
            constructor_args(&create),
            vec![
                format!("{implementation:?}"),
                format!("{owner:?}"),
                "0x".to_string()
            ]
        );

        Ok(())
    }

    #[test]
    fn custom_proxy_contract_is_used() -> eyre::Result<()> {
        let context = Arc::new(local_context(0)?);
        let options = ProxyOptions {
            kind: ProxyKind::Uups,
            contract: Some("MyProxy".to_string()),
            ..Default::default()
        };
        let deployer = ForgeProxyDeployer::new(context, options);

        let create = deployer.proxy_create(Address::zero(), Bytes::new());

        assert_eq!(create.args()[1], "MyProxy");

        Ok(())
    }

    fn slot_value(address: Address) -> String {
        format!("0x000000000000000000000000{}", hex::encode(address))
    }

    #[tokio::test]
    async fn uups_check_reads_only_the_implementation() -> eyre::Result<()> {
        let (provider, mock) = Provider::mocked();
        let proxy = Address::from_low_u64_be(1);
        let implementation = Address::from_low_u64_be(2);

        mock.push::<String, _>(slot_value(implementation))?;

        let admin =
            check_proxy(&provider, ProxyKind::Uups, proxy, implementation)
                .await?;

        // Only one response is queued, an admin read would have failed
        assert_eq!(admin, None);

        Ok(())
    }

    #[tokio::test]
    async fn transparent_check_records_the_admin() -> eyre::Result<()> {
        let (provider, mock) = Provider::mocked();
        let proxy = Address::from_low_u64_be(1);
        let implementation = Address::from_low_u64_be(2);
        let admin = Address::from_low_u64_be(3);

        // Responses are served last in, first out
        mock.push::<String, _>(slot_value(admin))?;
        mock.push::<String, _>(slot_value(implementation))?;

        let recorded = check_proxy(
            &provider,
            ProxyKind::Transparent,
            proxy,
            implementation,
        )
        .await?;

        assert_eq!(recorded, Some(admin));

        Ok(())
    }

    #[tokio::test]
    async fn mismatched_implementation_fails() -> eyre::Result<()> {
        let (provider, mock) = Provider::mocked();
        let proxy = Address::from_low_u64_be(1);
        let implementation = Address::from_low_u64_be(2);

        mock.push::<String, _>(slot_value(Address::from_low_u64_be(9)))?;

        let err =
            check_proxy(&provider, ProxyKind::Uups, proxy, implementation)
                .await
                .unwrap_err();

        assert!(format!("{err:?}").contains("instead of the deployed implementation"));

        Ok(())
    }
}
