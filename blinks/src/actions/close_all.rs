use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

use super::{
    carry_ref, claim_response, low_balance_note, parse_pubkey, referral_code, with_query, Action,
};
use crate::chain;
use crate::consts::*;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::*;

/// Closes a batch of empty accounts in one transaction. Without an explicit
/// `targets` list the signer's empty accounts are discovered.
pub struct CloseAllAction;

/// `targets=a,b,c`. Present but empty yields an empty list.
fn parse_targets(params: &HashMap<String, String>) -> Result<Option<Vec<Pubkey>>, AppError> {
    let Some(raw) = params.get("targets") else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_pubkey(s, "targets"))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[async_trait]
impl Action for CloseAllAction {
    fn path(&self) -> &'static str {
        "close-all"
    }

    async fn metadata(
        &self,
        state: &AppState,
        params: HashMap<String, String>,
    ) -> Result<ActionGetResponse, AppError> {
        let owner_pct = state.reclaimer.config().owner_share_bps as f64 / 100.0;
        let description = match parse_targets(&params)? {
            Some(targets) => format!(
                "Close {} empty token accounts in one transaction and keep {owner_pct}% of the reclaimed rent",
                targets.len()
            ),
            None => format!(
                "Find every empty token account in your wallet and close up to {MAX_ACCOUNTS_PER_TRANSACTION} of them in one transaction. You keep {owner_pct}% of the reclaimed rent."
            ),
        };

        Ok(
            ActionGetResponse::new(ICON_URL, "Reclaim Rent", &description, "Claim All SOL")
                .with_links(vec![LinkedAction {
                    href: carry_ref(&href_with_targets(&params), &params),
                    label: "Claim All SOL".into(),
                    parameters: None,
                }]),
        )
    }

    async fn execute(
        &self,
        state: &AppState,
        account: Pubkey,
        params: HashMap<String, String>,
    ) -> Result<ActionPostResponse, AppError> {
        let targets = parse_targets(&params)?;
        let balance = state.reclaimer.fee_payer_balance(&account).await?;

        let claim = match targets {
            Some(targets) => {
                state
                    .reclaimer
                    .close_account_bunch(&account, &targets, referral_code(&params))
                    .await?
            }
            None => {
                let found = chain::discover_empty_accounts(
                    state.reclaimer.source(),
                    &account,
                    MAX_ACCOUNTS_PER_TRANSACTION,
                )
                .await?;
                if found.is_empty() {
                    return Err(AppError::NotFound(
                        "No empty token accounts found for this wallet".into(),
                    ));
                }
                state
                    .reclaimer
                    .close_discovered(&account, &found, referral_code(&params))
                    .await?
            }
        };

        let message = format!(
            "Closed {} accounts. {} SOL reclaimed.",
            claim.accounts_closed(),
            claim.sol_received
        );
        claim_response(state, &claim, low_balance_note(message, balance)).await
    }
}

fn href_with_targets(params: &HashMap<String, String>) -> String {
    match params.get("targets") {
        Some(targets) => with_query("/api/actions/close-all", &[("targets", targets.as_str())]),
        None => "/api/actions/close-all".into(),
    }
}
