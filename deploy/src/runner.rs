use std::io::Write;

use anyhow::{anyhow, Result};

use crate::{
    deployer::{ContractDeployer, ContractFactoryHandle, DeployedContract},
    error::DeployError,
};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Resolves the factory for `contract`, deploys it once and reports the address to `out`.
pub async fn run<D: ContractDeployer>(
    deployer: &D,
    contract: &str,
    out: &mut impl Write,
) -> Result<DeployedContract> {
    let factory = deployer.contract_factory(contract).await?;
    log::info!("contract factory for {} resolved", contract);
    writeln!(out, "Deploying contract...")?;

    let deployed = factory.deploy().await?;
    if deployed.address.is_zero() {
        let err = DeployError::deployment(anyhow!("deployment returned the zero address"));
        return Err(err.into());
    }

    if let Some(hash) = deployed.transaction_hash {
        log::info!("{} created in transaction {:?}", contract, hash);
    }
    writeln!(out, "Deployed contract to {:?}", deployed.address)?;
    Ok(deployed)
}

/// Dumps a failure to `err` and returns the process exit status for `result`.
pub fn exit_status<T>(result: &Result<T>, err: &mut impl Write) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            let _ = writeln!(err, "Error: {:?}", e);
            EXIT_FAILURE
        }
    }
}
