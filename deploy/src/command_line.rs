use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::{
    config::{DeployConfig, FileConfig, Overrides, DEFAULT_CONFIG_FILE},
    deploy::EthersDeployer,
    deployer::DeployedContract,
    runner,
};

/// Deploys a compiled ERC-721 contract and prints its address.
///
/// Every option can also come from the environment or from `deploy.config.json`.
#[derive(Debug, Parser)]
pub struct CommandLine {
    #[clap(long, env = "DEPLOY_CONFIG")]
    config: Option<PathBuf>,

    #[clap(short, long, env = "DEPLOY_NETWORK")]
    network: Option<String>,

    #[clap(short, long, env = "RPC_URL")]
    rpc: Option<String>,

    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    sk: Option<String>,

    #[clap(short, long, env = "ARTIFACTS_DIR")]
    artifacts: Option<PathBuf>,

    #[clap(long, env = "CONTRACT_NAME")]
    contract: Option<String>,

    #[clap(long, env = "CONFIRMATIONS")]
    confirmations: Option<usize>,

    #[clap(long, env = "LEGACY_TX", num_args = 0..=1, default_missing_value = "true")]
    legacy: Option<bool>,
}

impl CommandLine {
    /// Runs the deployment and returns the process exit status.
    pub async fn execute(self) -> u8 {
        let result = self.deploy().await;
        runner::exit_status(&result, &mut io::stderr())
    }

    async fn deploy(self) -> Result<DeployedContract> {
        let (path, required) = match self.config {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let file = FileConfig::load(&path, required)?;

        let config = DeployConfig::resolve(
            Overrides {
                network: self.network,
                rpc: self.rpc,
                sk: self.sk,
                artifacts: self.artifacts,
                contract: self.contract,
                confirmations: self.confirmations,
                legacy: self.legacy,
            },
            file,
        )?;
        log::debug!("{:?}", config);

        let deployer = EthersDeployer::new(&config).await?;
        runner::run(&deployer, &config.contract, &mut io::stdout()).await
    }
}
