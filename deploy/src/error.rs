use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Failures of a single deployment run.
#[derive(Debug)]
pub enum DeployError {
    /// The named artifact could not be turned into a contract factory
    FactoryResolution {
        contract: String,
        source: anyhow::Error,
    },
    /// Submitting the creation transaction or waiting for it failed
    Deployment(anyhow::Error),
}

impl DeployError {
    pub fn factory(contract: &str, source: impl Into<anyhow::Error>) -> Self {
        DeployError::FactoryResolution {
            contract: contract.to_string(),
            source: source.into(),
        }
    }

    pub fn deployment(source: impl Into<anyhow::Error>) -> Self {
        DeployError::Deployment(source.into())
    }
}

impl Display for DeployError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::FactoryResolution { contract, .. } => {
                write!(f, "error resolving contract factory for {}", contract)
            }
            DeployError::Deployment(_) => write!(f, "error deploying contract"),
        }
    }
}

impl Error for DeployError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DeployError::FactoryResolution { source, .. } => Some(source.as_ref()),
            DeployError::Deployment(source) => Some(source.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn cause_is_kept_as_source() {
        let err = DeployError::factory("ERC721NFT", anyhow!("artifact ERC721NFT not found"));
        assert_eq!(err.to_string(), "error resolving contract factory for ERC721NFT");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("artifact ERC721NFT not found")
        );

        let report = format!("{:?}", anyhow::Error::from(err));
        assert!(report.contains("Caused by:"));
        assert!(report.contains("artifact ERC721NFT not found"));
    }

    #[test]
    fn deployment_chain_is_preserved() {
        let inner = anyhow!("nonce too low").context("failed to send transaction");
        let err = DeployError::deployment(inner);
        let causes: Vec<String> = anyhow::Error::from(err)
            .chain()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(
            causes,
            vec![
                "error deploying contract",
                "failed to send transaction",
                "nonce too low"
            ]
        );
    }
}
