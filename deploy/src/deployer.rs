use ethers::types::{H160, H256};

use crate::error::DeployError;

/// A contract that made it on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub address: H160,
    pub transaction_hash: Option<H256>,
}

/// Hands out factories for compiled contracts, looked up by artifact name.
pub trait ContractDeployer {
    type Factory: ContractFactoryHandle;

    async fn contract_factory(&self, name: &str) -> Result<Self::Factory, DeployError>;
}

/// Deploys one compiled contract with an empty constructor.
pub trait ContractFactoryHandle {
    async fn deploy(self) -> Result<DeployedContract, DeployError>;
}
