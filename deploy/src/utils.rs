use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    utils::hex,
};

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

pub fn parse_wallet(sk: &str) -> Result<LocalWallet> {
    let bytes = hex::decode(sk.trim().strip_prefix("0x").unwrap_or(sk.trim()))
        .context("private key is not valid hex")?;
    if bytes.len() != 32 {
        bail!("private key must be 32 bytes, got {}", bytes.len());
    }
    Ok(LocalWallet::from_bytes(&bytes)?)
}

/// Connects to `rpc` and signs with `sk` for whatever chain the node reports.
pub async fn setup_client(rpc: &str, sk: &str) -> Result<Arc<Client>> {
    let wallet = parse_wallet(sk)?;
    let provider =
        Provider::<Http>::try_from(rpc).with_context(|| format!("invalid rpc url {}", rpc))?;
    let chain_id = provider
        .get_chainid()
        .await
        .with_context(|| format!("failed to query chain id from {}", rpc))?
        .as_u64();
    log::info!("connected to chain {} via {}", chain_id, rpc);

    Ok(Arc::new(SignerMiddleware::new(
        provider,
        wallet.with_chain_id(chain_id),
    )))
}
