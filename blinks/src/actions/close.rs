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
use crate::split::FeeSplit;
use crate::state::AppState;
use crate::types::*;

pub struct CloseAction;

#[async_trait]
impl Action for CloseAction {
    fn path(&self) -> &'static str {
        "close"
    }

    async fn metadata(
        &self,
        state: &AppState,
        params: HashMap<String, String>,
    ) -> Result<ActionGetResponse, AppError> {
        let title = "Close Token Account";

        let Some(target) = get_optional_param::<Pubkey>(&params, "target")? else {
            return Ok(ActionGetResponse::new(
                ICON_URL,
                title,
                "Close an empty token account and reclaim its rent",
                "Close",
            )
            .with_links(vec![LinkedAction {
                href: carry_ref("/api/actions/close?target={target}", &params),
                label: "Close Account".into(),
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

        let bps = state.reclaimer.config().owner_share_bps;
        let estimate = FeeSplit::compute(token.lamports, bps, None).owner_share;
        let description = format!(
            "Close {target} and receive {} SOL of its {} SOL rent. Only its owner {} can close it.",
            program::lamports_to_sol(estimate),
            program::lamports_to_sol(token.lamports),
            token.owner
        );

        let resp = ActionGetResponse::new(ICON_URL, title, &description, "Close & Reclaim SOL");
        if token.amount > 0 {
            return Ok(resp.with_error(&format!(
                "Account still holds {} tokens; use close-with-balance",
                token.amount
            )));
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
            .close_account(&account, &target, referral_code(&params))
            .await?;

        let message = format!("Account closed. {} SOL reclaimed.", claim.sol_received);
        claim_response(state, &claim, low_balance_note(message, balance)).await
    }
}
