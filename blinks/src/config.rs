use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;

use crate::consts::*;
use crate::error::ReclaimError;

/// Parameters the claim engine reads once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimConfig {
    /// Wallet receiving the service's cut
    pub operator: Pubkey,
    /// Owner's cut of reclaimed rent, in basis points
    pub owner_share_bps: u16,
}

impl ReclaimConfig {
    pub fn new(operator: Pubkey, owner_share_bps: u16) -> Result<Self, ReclaimError> {
        if operator == Pubkey::default() {
            return Err(ReclaimError::Configuration(
                "operator wallet must not be the default key".into(),
            ));
        }
        if owner_share_bps as u64 > BPS_DENOMINATOR {
            return Err(ReclaimError::Configuration(format!(
                "owner share {owner_share_bps} bps exceeds {BPS_DENOMINATOR}"
            )));
        }
        Ok(Self {
            operator,
            owner_share_bps,
        })
    }
}

pub fn parse_operator(raw: &str) -> Result<Pubkey, ReclaimError> {
    raw.trim()
        .parse()
        .map_err(|_| ReclaimError::Configuration(format!("OPERATOR_WALLET is not a valid address: {raw}")))
}

/// Process configuration, read from the environment in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub bind_addr: String,
    pub base_url: String,
    pub affiliates_path: Option<PathBuf>,
    pub reclaim: ReclaimConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ReclaimError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReclaimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.into());
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.into());
        let base_url = lookup("BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));

        let operator = lookup("OPERATOR_WALLET")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ReclaimError::Configuration("OPERATOR_WALLET is not set".into()))?;
        let operator = parse_operator(&operator)?;

        let owner_share_bps = match lookup("OWNER_SHARE_BPS") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ReclaimError::Configuration(format!("OWNER_SHARE_BPS is not a number: {raw}"))
            })?,
            None => DEFAULT_OWNER_SHARE_BPS,
        };

        Ok(Self {
            rpc_url,
            bind_addr: format!("{host}:{port}"),
            base_url: base_url.trim_end_matches('/').to_string(),
            affiliates_path: lookup("AFFILIATES_PATH").map(PathBuf::from),
            reclaim: ReclaimConfig::new(operator, owner_share_bps)?,
        })
    }
}
