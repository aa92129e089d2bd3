use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

use super::{
    carry_ref, claim_response, get_optional_param, get_param, low_balance_note, referral_code,
    Action,
};
use crate::consts::*;
use crate::error::AppError;
use crate::program;
use crate::state::AppState;
use crate::types::*;

/// Burns whatever the account still holds, then closes it.
pub struct CloseWithBalanceAction;

#[async_trait]
impl Action for CloseWithBalanceAction {
    fn path(&self) -> &'static str {
        "close-with-balance"
    }

    async fn metadata(
        &self,
        state: &AppState,
        params: HashMap<String, String>,
    ) -> Result<ActionGetResponse, AppError> {
        let title = "Burn & Close Token Account";

        let Some(target) = get_optional_param::<Pubkey>(&params, "target")? else {
            return Ok(ActionGetResponse::new(
                ICON_URL,
                title,
                "Burn the remaining tokens of an account and reclaim its rent. Burned tokens cannot be recovered.",
                "Burn & Close",
            )
            .with_links(vec![LinkedAction {
                href: carry_ref("/api/actions/close-with-balance?target={target}", &params),
                label: "Burn & Close".into(),
                parameters: Some(vec![ActionParameter::text(
                    "target",
                    "Token account address",
                    true,
                )]),
            }]));
        };

        let source = state.reclaimer.source();
        let token = source
            .get_token_account(&target)
            .await?
            .ok_or_else(|| AppError::NotFound("Token account not found on chain".into()))?;

        let description = format!(
            "Burn {} tokens of mint {} held by {target}, then close it to reclaim {} SOL of rent. Burned tokens cannot be recovered.",
            token.amount,
            token.mint,
            program::lamports_to_sol(token.lamports)
        );

        let resp = ActionGetResponse::new(ICON_URL, title, &description, "Burn & Close");
        if token.amount == 0 {
            return Ok(resp.with_error("Account holds no tokens; use close instead"));
        }
        Ok(resp)
    }

    async fn execute(
        &self,
        state: &AppState,
        account: Pubkey,
        params: HashMap<String, String>,
    ) -> Result<ActionPostResponse, AppError> {
        let target: Pubkey = get_param(&params, "target")?;
        let balance = state.reclaimer.fee_payer_balance(&account).await?;

        let claim = state
            .reclaimer
            .close_account_with_balance(&account, &target, referral_code(&params))
            .await?;

        let burned = claim.closed.first().map(|c| c.burned).unwrap_or(0);
        let message = format!(
            "Burned {burned} tokens and closed the account. {} SOL reclaimed.",
            claim.sol_received
        );
        claim_response(state, &claim, low_balance_note(message, balance)).await
    }
}
