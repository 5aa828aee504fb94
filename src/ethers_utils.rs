use ethers::providers::Middleware;
use ethers::types::{Address, H256};
use eyre::Context;
use hex_literal::hex;

/// `bytes32(uint256(keccak256("eip1967.proxy.implementation")) - 1)`
pub const IMPLEMENTATION_SLOT: H256 = H256(hex!(
    "360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc"
));

/// `bytes32(uint256(keccak256("eip1967.proxy.admin")) - 1)`
pub const ADMIN_SLOT: H256 = H256(hex!(
    "b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103"
));

pub fn address_from_slot(value: H256) -> Address {
    Address::from_slice(&value.as_bytes()[12..])
}

pub async fn read_address_slot<M: Middleware>(
    client: &M,
    contract: Address,
    slot: H256,
) -> eyre::Result<Address>
where
    M::Error: 'static,
{
    let value = client
        .get_storage_at(contract, slot, None)
        .await
        .with_context(|| format!("Reading slot {slot:?} of {contract:?}"))?;

    Ok(address_from_slot(value))
}
