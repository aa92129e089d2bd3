use solana_sdk::signature::Signature;
use std::collections::HashMap;

use super::{get_param, parse_pubkey};
use crate::chain::SignatureStatus;
use crate::consts::ICON_URL;
use crate::error::{AppError, ReclaimError};
use crate::history::{self, ClaimRecord};
use crate::state::AppState;
use crate::types::{ActionGetResponse, NextActionPostRequest};

/// Chained `next` action, called by the wallet after the claim landed.
///
/// The `claim` id names the transaction this server built. It is recorded
/// only when the signature is the owner's over that exact message and the
/// node reports it succeeded. Recording itself is spawned and not awaited.
pub async fn confirm(
    state: &AppState,
    body: NextActionPostRequest,
    params: &HashMap<String, String>,
) -> Result<ActionGetResponse, AppError> {
    let owner = parse_pubkey(&body.account, "account")?;
    let signature: Signature = body
        .signature
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid 'signature' parameter".into()))?;
    let id: String = get_param(params, "claim")?;

    let pending = state
        .pending
        .get(&id)?
        .ok_or_else(|| AppError::NotFound("Unknown or expired claim".into()))?;
    if pending.owner != owner {
        return Err(AppError::BadRequest("Claim belongs to another wallet".into()));
    }
    if !pending.signed_by_owner(&signature) {
        return Err(AppError::BadRequest(
            "Signature does not match the claim transaction".into(),
        ));
    }

    match state.reclaimer.source().get_signature_status(&signature).await? {
        SignatureStatus::Succeeded => {}
        SignatureStatus::Unknown => return Err(ReclaimError::UnconfirmedClaim(signature).into()),
        SignatureStatus::Failed => return Err(ReclaimError::FailedClaim(signature).into()),
    }

    if state.pending.complete(&id)? {
        tracing::info!(
            "Claim {signature} confirmed by {owner}: {} SOL, {} accounts",
            pending.sol_received,
            pending.accounts_closed
        );
        history::record_claim(
            state.history.clone(),
            state.reclaimer.referrals(),
            ClaimRecord::new(
                owner,
                signature,
                pending.sol_received,
                pending.sol_shared.unwrap_or(0.0),
                pending.accounts_closed,
            ),
            pending.referrer,
        );
    } else {
        tracing::debug!("Claim {id} already recorded");
    }

    Ok(ActionGetResponse::completed(
        ICON_URL,
        "Rent Reclaimed",
        &format!(
            "{} SOL reclaimed from {} closed accounts.",
            pending.sol_received, pending.accounts_closed
        ),
    ))
}
