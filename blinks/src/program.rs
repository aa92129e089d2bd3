use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;

use crate::chain::{AccountSource, TokenAccount};
use crate::error::ReclaimError;

// ============================================================
// Instruction builders
// ============================================================

/// Compute-unit limit followed by compute-unit price. Always the first two
/// instructions of a claim transaction.
pub fn compute_budget_instructions(unit_limit: u32, micro_lamports: u64) -> [Instruction; 2] {
    [
        ComputeBudgetInstruction::set_compute_unit_limit(unit_limit),
        ComputeBudgetInstruction::set_compute_unit_price(micro_lamports),
    ]
}

/// Close `account`, sending its rent to `owner`, who is also the close authority.
pub fn close_instruction(account: &Pubkey, owner: &Pubkey) -> Result<Instruction, ReclaimError> {
    Ok(spl_token::instruction::close_account(
        &spl_token::id(),
        account,
        owner,
        owner,
        &[],
    )?)
}

/// Burn the full `amount` held by `account`.
pub fn burn_instruction(
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction, ReclaimError> {
    Ok(spl_token::instruction::burn(
        &spl_token::id(),
        account,
        mint,
        owner,
        &[],
        amount,
    )?)
}

// ============================================================
// Per-account closures
// ============================================================

/// Instructions that close one account, plus the rent they release.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountClosure {
    pub account: Pubkey,
    pub mint: Pubkey,
    /// Lamports released to the owner by the close
    pub reclaimed: u64,
    /// Token amount burned before the close, zero on the empty path
    pub burned: u64,
    pub instructions: Vec<Instruction>,
}

pub fn require_key(key: &Pubkey, name: &'static str) -> Result<(), ReclaimError> {
    if *key == Pubkey::default() {
        return Err(ReclaimError::MissingParameter(name));
    }
    Ok(())
}

/// One read per account: missing is `AccountInfoUnavailable`.
async fn fetch_closable(
    source: &dyn AccountSource,
    owner: &Pubkey,
    account: &Pubkey,
) -> Result<TokenAccount, ReclaimError> {
    require_key(owner, "owner")?;
    require_key(account, "account")?;

    source
        .get_token_account(account)
        .await?
        .ok_or(ReclaimError::AccountInfoUnavailable(*account))
}

fn require_owned(owner: &Pubkey, account: &Pubkey, token: &TokenAccount) -> Result<(), ReclaimError> {
    if token.owner != *owner {
        return Err(ReclaimError::ForeignAccount {
            account: *account,
            owner: token.owner,
        });
    }
    Ok(())
}

/// Close instruction for an already-read account that must hold no tokens.
pub fn empty_account_closure(
    owner: &Pubkey,
    account: &Pubkey,
    token: &TokenAccount,
) -> Result<AccountClosure, ReclaimError> {
    require_owned(owner, account, token)?;
    if token.amount > 0 {
        return Err(ReclaimError::UnexpectedBalance {
            account: *account,
            amount: token.amount,
        });
    }

    Ok(AccountClosure {
        account: *account,
        mint: token.mint,
        reclaimed: token.lamports,
        burned: 0,
        instructions: vec![close_instruction(account, owner)?],
    })
}

/// Burn then close for an already-read account that must hold tokens.
pub fn burn_account_closure(
    owner: &Pubkey,
    account: &Pubkey,
    token: &TokenAccount,
) -> Result<AccountClosure, ReclaimError> {
    require_owned(owner, account, token)?;
    if token.amount == 0 {
        return Err(ReclaimError::ZeroBalanceAccount(*account));
    }

    Ok(AccountClosure {
        account: *account,
        mint: token.mint,
        reclaimed: token.lamports,
        burned: token.amount,
        instructions: vec![
            burn_instruction(account, &token.mint, owner, token.amount)?,
            close_instruction(account, owner)?,
        ],
    })
}

/// Close an account that is expected to hold no tokens.
pub async fn close_account_instructions(
    source: &dyn AccountSource,
    owner: &Pubkey,
    account: &Pubkey,
) -> Result<AccountClosure, ReclaimError> {
    let token = fetch_closable(source, owner, account).await?;
    empty_account_closure(owner, account, &token)
}

/// Burn the remaining balance of `account`, then close it.
pub async fn close_account_with_balance_instructions(
    source: &dyn AccountSource,
    owner: &Pubkey,
    account: &Pubkey,
) -> Result<AccountClosure, ReclaimError> {
    let token = fetch_closable(source, owner, account).await?;
    burn_account_closure(owner, account, &token)
}

// ============================================================
// Helpers
// ============================================================

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
