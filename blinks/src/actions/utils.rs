use base64::Engine;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::collections::HashMap;
use std::str::FromStr;

use crate::consts::LOW_BALANCE_LAMPORTS;
use crate::error::{AppError, ReclaimError};
use crate::pending::PendingClaim;
use crate::program::lamports_to_sol;
use crate::reclaim::ClaimTransaction;
use crate::state::AppState;
use crate::types::{ActionPostResponse, NextActionLink, PostResponseLinks};

pub fn get_param<T: FromStr>(
    params: &HashMap<String, String>,
    key: &'static str,
) -> Result<T, AppError> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ReclaimError::MissingParameter(key))?
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid '{key}' parameter")))
}

pub fn get_optional_param<T: FromStr>(
    params: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid '{key}' parameter"))),
        None => Ok(None),
    }
}

pub fn parse_pubkey(raw: &str, key: &str) -> Result<Pubkey, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid '{key}' parameter")))
}

/// `ref` query parameter, the referral code the blink was shared with.
pub fn referral_code(params: &HashMap<String, String>) -> Option<&str> {
    params
        .get("ref")
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
}

pub fn serialize_tx(tx: &Transaction) -> Result<String, AppError> {
    let bytes = bincode::serialize(tx)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Append `pairs` to `href` as percent-encoded query parameters.
pub fn with_query(href: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return href.to_string();
    }
    match serde_urlencoded::to_string(pairs) {
        Ok(query) => {
            let sep = if href.contains('?') { '&' } else { '?' };
            format!("{href}{sep}{query}")
        }
        Err(e) => {
            tracing::warn!("Dropping query for {href}: {e}");
            href.to_string()
        }
    }
}

/// Carry the referral code over to a linked action.
pub fn carry_ref(href: &str, params: &HashMap<String, String>) -> String {
    match referral_code(params) {
        Some(code) => with_query(href, &[("ref", code)]),
        None => href.to_string(),
    }
}

/// Point out a low fee-payer balance in the action message.
pub fn low_balance_note(message: String, balance: u64) -> String {
    if balance < LOW_BALANCE_LAMPORTS {
        format!(
            "{message} Your wallet holds only {} SOL; keep enough for network fees.",
            lamports_to_sol(balance)
        )
    } else {
        message
    }
}

/// Stamp a fresh blockhash onto the claim, park it until the wallet confirms,
/// and wrap it for the wallet.
pub async fn claim_response(
    state: &AppState,
    claim: &ClaimTransaction,
    message: String,
) -> Result<ActionPostResponse, AppError> {
    let blockhash = state.reclaimer.source().get_latest_blockhash().await?;
    let tx = claim.transaction(&blockhash);
    let transaction = serialize_tx(&tx)?;

    let id = state.pending.insert(PendingClaim::new(claim, &blockhash))?;
    let href = with_query(
        &format!("{}/api/actions/confirm", state.base_url),
        &[("claim", id.as_str())],
    );

    Ok(ActionPostResponse {
        transaction,
        message: Some(message),
        links: Some(PostResponseLinks {
            next: NextActionLink::Post { href },
        }),
    })
}
