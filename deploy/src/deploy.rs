use std::sync::Arc;

use anyhow::{anyhow, Result};
use ethers::{
    contract::ContractFactory,
    types::{TransactionReceipt, U64},
};

use crate::{
    artifact::ArtifactStore,
    config::DeployConfig,
    deployer::{ContractDeployer, ContractFactoryHandle, DeployedContract},
    error::DeployError,
    utils::{setup_client, Client},
};

/// Deploys hardhat artifacts through an ethers signing client.
pub struct EthersDeployer {
    client: Arc<Client>,
    artifacts: ArtifactStore,
    confirmations: usize,
    legacy: bool,
}

impl EthersDeployer {
    pub async fn new(config: &DeployConfig) -> Result<Self> {
        let client = setup_client(&config.rpc_url, &config.private_key).await?;
        log::info!(
            "deploying from {:?} on network {}",
            client.address(),
            config.network
        );

        Ok(Self {
            client,
            artifacts: ArtifactStore::new(&config.artifacts_dir),
            confirmations: config.confirmations,
            legacy: config.legacy,
        })
    }
}

pub struct EthersFactory {
    contract: String,
    factory: ContractFactory<Client>,
    confirmations: usize,
    legacy: bool,
}

impl ContractDeployer for EthersDeployer {
    type Factory = EthersFactory;

    async fn contract_factory(&self, name: &str) -> Result<EthersFactory, DeployError> {
        let artifact = self
            .artifacts
            .load(name)
            .map_err(|e| DeployError::factory(name, e))?;
        log::info!(
            "{} from {}: {} bytes of creation code",
            artifact.contract_name,
            artifact.source_name,
            artifact.bytecode.len()
        );

        Ok(EthersFactory {
            contract: artifact.contract_name,
            factory: ContractFactory::new(artifact.abi, artifact.bytecode, self.client.clone()),
            confirmations: self.confirmations,
            legacy: self.legacy,
        })
    }
}

impl ContractFactoryHandle for EthersFactory {
    async fn deploy(self) -> Result<DeployedContract, DeployError> {
        let mut deployer = self
            .factory
            .deploy(())
            .map_err(DeployError::deployment)?
            .confirmations(self.confirmations);
        if self.legacy {
            deployer = deployer.legacy();
        }

        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .map_err(DeployError::deployment)?;
        log::info!(
            "{} creation transaction hash:{:?} block:{:?}",
            self.contract,
            receipt.transaction_hash,
            receipt.block_number
        );
        check_receipt(&receipt)?;

        Ok(DeployedContract {
            address: contract.address(),
            transaction_hash: Some(receipt.transaction_hash),
        })
    }
}

fn check_receipt(receipt: &TransactionReceipt) -> Result<(), DeployError> {
    if receipt.status == Some(U64::zero()) {
        return Err(DeployError::deployment(anyhow!(
            "creation transaction {:?} reverted",
            receipt.transaction_hash
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use ethers::{
        middleware::SignerMiddleware,
        providers::{Http, Provider},
        signers::Signer,
        types::{Bytes, H256},
    };
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::utils::parse_wallet;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    // nothing listens on port 1, and nothing here reaches the node
    fn deployer(artifacts: &Path) -> EthersDeployer {
        let provider = Provider::<Http>::try_from("http://127.0.0.1:1").unwrap();
        let wallet = parse_wallet(KEY).unwrap().with_chain_id(31337u64);
        EthersDeployer {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            artifacts: ArtifactStore::new(artifacts),
            confirmations: 1,
            legacy: false,
        }
    }

    fn write_artifact(root: &Path, contract: &str, abi: serde_json::Value, bytecode: &str) {
        let dir = root.join(format!("contracts/{}.sol", contract));
        fs::create_dir_all(&dir).unwrap();
        let artifact = json!({
            "contractName": contract,
            "sourceName": format!("contracts/{}.sol", contract),
            "abi": abi,
            "bytecode": bytecode,
            "linkReferences": {}
        });
        fs::write(dir.join(format!("{}.json", contract)), artifact.to_string()).unwrap();
    }

    async fn resolve(
        deployer: &EthersDeployer,
        name: &str,
    ) -> Result<EthersFactory, DeployError> {
        deployer.contract_factory(name).await
    }

    #[tokio::test]
    async fn missing_artifact_is_factory_resolution() {
        let dir = TempDir::new().unwrap();
        let deployer = deployer(dir.path());

        match resolve(&deployer, "ERC721NFT").await {
            Err(DeployError::FactoryResolution { contract, source }) => {
                assert_eq!(contract, "ERC721NFT");
                assert!(source.to_string().contains("not found"));
            }
            Err(e) => panic!("unexpected error: {:?}", e),
            Ok(_) => panic!("factory resolved without an artifact"),
        }
    }

    #[tokio::test]
    async fn empty_bytecode_is_factory_resolution() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "IERC721", json!([]), "0x");
        let deployer = deployer(dir.path());

        match resolve(&deployer, "IERC721").await {
            Err(DeployError::FactoryResolution { source, .. }) => {
                assert!(source.to_string().contains("no creation bytecode"));
            }
            Err(e) => panic!("unexpected error: {:?}", e),
            Ok(_) => panic!("factory resolved for an interface"),
        }
    }

    #[tokio::test]
    async fn factory_carries_artifact_bytecode() {
        let dir = TempDir::new().unwrap();
        let abi = json!([{ "inputs": [], "stateMutability": "nonpayable", "type": "constructor" }]);
        write_artifact(dir.path(), "ERC721NFT", abi, "0x6080604052");
        let deployer = deployer(dir.path());

        let factory = match resolve(&deployer, "ERC721NFT").await {
            Ok(factory) => factory,
            Err(e) => panic!("factory not resolved: {:?}", e),
        };
        assert_eq!(factory.contract, "ERC721NFT");
        assert_eq!(factory.confirmations, 1);

        let tx = factory.factory.deploy(()).unwrap().tx;
        assert_eq!(
            tx.data().cloned(),
            Some(Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52]))
        );
    }

    #[tokio::test]
    async fn constructor_arguments_mismatch_is_deployment_error() {
        let dir = TempDir::new().unwrap();
        let abi = json!([{
            "inputs": [{ "internalType": "string", "name": "name", "type": "string" }],
            "stateMutability": "nonpayable",
            "type": "constructor"
        }]);
        write_artifact(dir.path(), "NamedNFT", abi, "0x6080604052");
        let deployer = deployer(dir.path());

        let factory = match resolve(&deployer, "NamedNFT").await {
            Ok(factory) => factory,
            Err(e) => panic!("factory not resolved: {:?}", e),
        };
        assert!(matches!(
            factory.deploy().await,
            Err(DeployError::Deployment(_))
        ));
    }

    #[test]
    fn reverted_receipt_fails() {
        let receipt = TransactionReceipt {
            transaction_hash: H256::repeat_byte(0xab),
            status: Some(U64::zero()),
            ..Default::default()
        };
        let err = check_receipt(&receipt).unwrap_err();
        assert!(matches!(err, DeployError::Deployment(_)));
        assert!(format!("{:?}", anyhow::Error::from(err)).contains("reverted"));

        let mined = TransactionReceipt {
            status: Some(U64::one()),
            ..Default::default()
        };
        assert!(check_receipt(&mined).is_ok());
    }
}
