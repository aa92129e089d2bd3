use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::collections::HashSet;
use std::sync::Arc;

use crate::chain::{AccountSource, KeyedTokenAccount};
use crate::config::ReclaimConfig;
use crate::consts::*;
use crate::error::ReclaimError;
use crate::program::{self, AccountClosure};
use crate::referral::{Referral, ReferralDirectory};
use crate::split::FeeSplit;

/// A fully composed, unsigned claim.
///
/// Instruction order: compute-unit limit, compute-unit price, per-account
/// burn/close instructions in caller order, an optional referrer transfer,
/// then the operator transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimTransaction {
    pub owner: Pubkey,
    pub instructions: Vec<Instruction>,
    pub closed: Vec<AccountClosure>,
    pub split: FeeSplit,
    /// Set only when a referral resolved to a live account
    pub referrer: Option<Pubkey>,
    /// Owner's share in SOL
    pub sol_received: f64,
    /// Referrer's share in SOL, when a referral applied
    pub sol_shared: Option<f64>,
}

impl ClaimTransaction {
    pub fn accounts_closed(&self) -> usize {
        self.closed.len()
    }

    pub fn message(&self, blockhash: &Hash) -> Message {
        Message::new_with_blockhash(&self.instructions, Some(&self.owner), blockhash)
    }

    /// Unsigned transaction paid for by the owner, ready for the wallet.
    pub fn transaction(&self, blockhash: &Hash) -> Transaction {
        Transaction::new_unsigned(self.message(blockhash))
    }
}

/// Composes claim transactions. Holds no per-claim state, so one instance
/// serves any number of concurrent requests.
pub struct Reclaimer {
    config: ReclaimConfig,
    source: Arc<dyn AccountSource>,
    referrals: Arc<dyn ReferralDirectory>,
}

impl Reclaimer {
    pub fn new(
        config: ReclaimConfig,
        source: Arc<dyn AccountSource>,
        referrals: Arc<dyn ReferralDirectory>,
    ) -> Self {
        Self {
            config,
            source,
            referrals,
        }
    }

    pub fn config(&self) -> &ReclaimConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn AccountSource {
        self.source.as_ref()
    }

    pub fn referrals(&self) -> Arc<dyn ReferralDirectory> {
        self.referrals.clone()
    }

    /// Close a single account that holds no tokens.
    pub async fn close_account(
        &self,
        owner: &Pubkey,
        account: &Pubkey,
        referral_code: Option<&str>,
    ) -> Result<ClaimTransaction, ReclaimError> {
        let closure = program::close_account_instructions(self.source(), owner, account).await?;
        self.assemble(owner, CLOSE_COMPUTE_UNITS, vec![closure], referral_code)
            .await
    }

    /// Burn the remaining balance of a single account, then close it.
    pub async fn close_account_with_balance(
        &self,
        owner: &Pubkey,
        account: &Pubkey,
        referral_code: Option<&str>,
    ) -> Result<ClaimTransaction, ReclaimError> {
        let closure =
            program::close_account_with_balance_instructions(self.source(), owner, account).await?;
        self.assemble(owner, BURN_CLOSE_COMPUTE_UNITS, vec![closure], referral_code)
            .await
    }

    /// Close a batch of empty accounts. The split is computed once, over the
    /// summed rent.
    pub async fn close_account_bunch(
        &self,
        owner: &Pubkey,
        accounts: &[Pubkey],
        referral_code: Option<&str>,
    ) -> Result<ClaimTransaction, ReclaimError> {
        program::require_key(owner, "owner")?;

        let mut seen = HashSet::with_capacity(accounts.len());
        let unique: Vec<&Pubkey> = accounts.iter().filter(|a| seen.insert(**a)).collect();
        if unique.len() != accounts.len() {
            tracing::warn!(
                "Dropped {} duplicate accounts from batch for {owner}",
                accounts.len() - unique.len()
            );
        }
        check_batch_size(unique.len())?;

        let mut closures = Vec::with_capacity(unique.len());
        for account in unique {
            closures.push(program::close_account_instructions(self.source(), owner, account).await?);
        }
        self.assemble_batch(owner, closures, referral_code).await
    }

    /// Batch close over accounts already read by discovery, without fetching
    /// them again.
    pub async fn close_discovered(
        &self,
        owner: &Pubkey,
        found: &[KeyedTokenAccount],
        referral_code: Option<&str>,
    ) -> Result<ClaimTransaction, ReclaimError> {
        program::require_key(owner, "owner")?;
        check_batch_size(found.len())?;

        let closures = found
            .iter()
            .map(|k| program::empty_account_closure(owner, &k.account, &k.token))
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble_batch(owner, closures, referral_code).await
    }

    /// Lamports held by the fee payer. Fails below the minimum needed to pay
    /// for a claim and warns when the balance is merely low.
    pub async fn fee_payer_balance(&self, owner: &Pubkey) -> Result<u64, ReclaimError> {
        program::require_key(owner, "owner")?;
        let available = self
            .source
            .get_account_info(owner)
            .await?
            .map(|info| info.lamports)
            .unwrap_or(0);

        if available < MIN_FEE_PAYER_LAMPORTS {
            return Err(ReclaimError::InsufficientFunds {
                available,
                required: MIN_FEE_PAYER_LAMPORTS,
            });
        }
        if available < LOW_BALANCE_LAMPORTS {
            tracing::warn!("Fee payer {owner} is low on SOL: {available} lamports");
        }
        Ok(available)
    }

    async fn assemble_batch(
        &self,
        owner: &Pubkey,
        closures: Vec<AccountClosure>,
        referral_code: Option<&str>,
    ) -> Result<ClaimTransaction, ReclaimError> {
        let unit_limit = CLOSE_COMPUTE_UNITS * closures.len() as u32;
        self.assemble(owner, unit_limit, closures, referral_code)
            .await
    }

    /// A referral only counts when its wallet exists on-chain; anything else
    /// degrades to no referral.
    async fn resolve_live_referral(&self, code: Option<&str>) -> Option<Referral> {
        let referral = self.referrals.resolve_referral(code?).await?;
        match self.source.get_account_info(&referral.wallet).await {
            Ok(Some(_)) => Some(referral),
            Ok(None) => {
                tracing::warn!(
                    "Referrer {} for code '{}' has no account, ignoring",
                    referral.wallet,
                    referral.code
                );
                None
            }
            Err(e) => {
                tracing::warn!("Could not look up referrer {}: {e}", referral.wallet);
                None
            }
        }
    }

    async fn assemble(
        &self,
        owner: &Pubkey,
        unit_limit: u32,
        closed: Vec<AccountClosure>,
        referral_code: Option<&str>,
    ) -> Result<ClaimTransaction, ReclaimError> {
        let total = closed.iter().try_fold(0u64, |acc, c| acc.checked_add(c.reclaimed));
        let total = total.ok_or(ReclaimError::Instruction(
            solana_sdk::program_error::ProgramError::ArithmeticOverflow,
        ))?;

        let referral = self.resolve_live_referral(referral_code).await;
        let split = FeeSplit::compute(total, self.config.owner_share_bps, referral.as_ref());
        let referrer = referral.as_ref().map(|r| r.wallet);

        let mut instructions = Vec::with_capacity(2 + closed.len() * 2 + 2);
        instructions.extend(program::compute_budget_instructions(
            unit_limit,
            COMPUTE_UNIT_PRICE_MICRO_LAMPORTS,
        ));
        for closure in &closed {
            instructions.extend(closure.instructions.iter().cloned());
        }
        instructions.extend(split.transfer_instructions(
            owner,
            &self.config.operator,
            referrer.as_ref(),
        ));

        tracing::info!(
            "Claim for {owner}: {} accounts, {total} lamports (owner {}, operator {}, referrer {})",
            closed.len(),
            split.owner_share,
            split.operator_share,
            split.referrer_share
        );

        Ok(ClaimTransaction {
            owner: *owner,
            instructions,
            closed,
            split,
            referrer,
            sol_received: program::lamports_to_sol(split.owner_share),
            sol_shared: referrer.map(|_| program::lamports_to_sol(split.referrer_share)),
        })
    }
}

fn check_batch_size(count: usize) -> Result<(), ReclaimError> {
    if count == 0 {
        return Err(ReclaimError::EmptyBatch);
    }
    if count > MAX_ACCOUNTS_PER_TRANSACTION {
        return Err(ReclaimError::BatchTooLarge {
            count,
            max: MAX_ACCOUNTS_PER_TRANSACTION,
        });
    }
    Ok(())
}
