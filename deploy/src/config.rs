use std::{
    collections::BTreeMap,
    fmt,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "deploy.config.json";
pub const DEFAULT_NETWORK: &str = "localhost";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_CONTRACT: &str = "ERC721NFT";
pub const DEFAULT_CONFIRMATIONS: usize = 1;

/// `deploy.config.json`, shaped after the `networks`/`paths` part of a hardhat config.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub default_network: Option<String>,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Paths {
    pub artifacts: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
    pub confirmations: Option<usize>,
    pub legacy: Option<bool>,
}

impl FileConfig {
    /// Reads the config file. A missing file is only an error when it was asked for explicitly.
    pub fn load(path: &Path, required: bool) -> Result<Option<Self>> {
        if !path.exists() {
            if required {
                bail!("config file {} does not exist", path.display());
            }
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(config))
    }
}

/// Values given on the command line or through the environment.
#[derive(Default)]
pub struct Overrides {
    pub network: Option<String>,
    pub rpc: Option<String>,
    pub sk: Option<String>,
    pub artifacts: Option<PathBuf>,
    pub contract: Option<String>,
    pub confirmations: Option<usize>,
    pub legacy: Option<bool>,
}

pub struct DeployConfig {
    pub network: String,
    pub rpc_url: String,
    pub private_key: String,
    pub artifacts_dir: PathBuf,
    pub contract: String,
    pub confirmations: usize,
    pub legacy: bool,
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("artifacts_dir", &self.artifacts_dir)
            .field("contract", &self.contract)
            .field("confirmations", &self.confirmations)
            .field("legacy", &self.legacy)
            .finish()
    }
}

impl DeployConfig {
    pub fn resolve(overrides: Overrides, file: Option<FileConfig>) -> Result<Self> {
        let has_file = file.is_some();
        let mut file = file.unwrap_or_default();

        let network = overrides
            .network
            .or_else(|| file.default_network.clone())
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());

        let network_config = match file.networks.remove(&network) {
            Some(config) => config,
            None if has_file && network != DEFAULT_NETWORK => {
                let known: Vec<&str> = file.networks.keys().map(String::as_str).collect();
                bail!(
                    "network {} is not configured, known networks: [{}]",
                    network,
                    known.join(", ")
                );
            }
            None => NetworkConfig::default(),
        };

        let rpc_url = overrides
            .rpc
            .or(network_config.url)
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let private_key = overrides
            .sk
            .or_else(|| network_config.accounts.into_iter().next())
            .ok_or_else(|| {
                anyhow!(
                    "no deployer key for network {}, pass --sk, set PRIVATE_KEY or add an account to the config file",
                    network
                )
            })?;

        Ok(Self {
            rpc_url,
            private_key,
            artifacts_dir: overrides
                .artifacts
                .or(file.paths.artifacts)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
            contract: overrides
                .contract
                .unwrap_or_else(|| DEFAULT_CONTRACT.to_string()),
            confirmations: overrides
                .confirmations
                .or(network_config.confirmations)
                .unwrap_or(DEFAULT_CONFIRMATIONS),
            legacy: overrides.legacy.or(network_config.legacy).unwrap_or(false),
            network,
        })
    }
}
