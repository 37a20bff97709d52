use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

const BUILD_INFO_DIR: &str = "build-info";

/// A compiled contract as laid out by hardhat under `artifacts/`.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    source_name: String,
    abi: Abi,
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    /// Loads `name`, either bare (`ERC721NFT`) or fully qualified
    /// (`contracts/ERC721NFT.sol:ERC721NFT`).
    pub fn load(&self, name: &str) -> Result<Artifact> {
        if !self.root.is_dir() {
            bail!(
                "artifact {} not found: artifacts directory {} does not exist, compile the contracts first",
                name,
                self.root.display()
            );
        }

        let path = match name.rsplit_once(':') {
            Some((source, contract)) => {
                let path = self.root.join(source).join(format!("{}.json", contract));
                if !path.is_file() {
                    bail!("artifact {} not found at {}", name, path.display());
                }
                path
            }
            None => self.find_unique(name)?,
        };

        let artifact = read_artifact(&path)?;
        let contract = name.rsplit(':').next().unwrap_or(name);
        if artifact.contract_name != contract {
            bail!(
                "{} holds contract {}, not {}",
                path.display(),
                artifact.contract_name,
                contract
            );
        }
        Ok(artifact)
    }

    fn find_unique(&self, contract: &str) -> Result<PathBuf> {
        let file_name = format!("{}.json", contract);
        let mut found = Vec::new();
        collect_named(&self.root, &file_name, &mut found)?;

        let mut matches = Vec::new();
        for path in found {
            let source = path
                .parent()
                .and_then(|p| p.strip_prefix(&self.root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            matches.push((format!("{}:{}", source, contract), path));
        }
        matches.sort();

        match matches.len() {
            0 => Err(anyhow!(
                "artifact {} not found in {}",
                contract,
                self.root.display()
            )),
            1 => Ok(matches.remove(0).1),
            _ => {
                let names: Vec<String> = matches.into_iter().map(|(name, _)| name).collect();
                Err(anyhow!(
                    "several artifacts are named {}, use one of the fully qualified names: {}",
                    contract,
                    names.join(", ")
                ))
            }
        }
    }
}

fn collect_named(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            if name != BUILD_INFO_DIR {
                collect_named(&path, file_name, found)?;
            }
        } else if name == file_name {
            found.push(path);
        }
    }
    Ok(())
}

fn read_artifact(path: &Path) -> Result<Artifact> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let raw: RawArtifact = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse artifact {}", path.display()))?;

    if !raw.link_references.is_empty() {
        let libraries: Vec<&str> = raw.link_references.keys().map(String::as_str).collect();
        bail!(
            "{} needs linked libraries from {}, which is not supported",
            raw.contract_name,
            libraries.join(", ")
        );
    }

    let bytecode = Bytes::from_str(raw.bytecode.trim())
        .map_err(|e| anyhow!("invalid bytecode in {}: {}", path.display(), e))?;
    if bytecode.is_empty() {
        bail!(
            "{} has no creation bytecode, abstract contracts and interfaces cannot be deployed",
            raw.contract_name
        );
    }

    log::debug!("loaded artifact {} from {}", raw.contract_name, path.display());
    Ok(Artifact {
        contract_name: raw.contract_name,
        source_name: raw.source_name,
        abi: raw.abi,
        bytecode,
    })
}
