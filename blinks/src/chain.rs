use async_trait::async_trait;
use serde_json::Value;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use spl_token::solana_program::program_pack::Pack;

use crate::error::ReclaimError;

/// Lamports and owning program of an on-chain account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: Pubkey,
}

/// An SPL token account as read in a single fetch: its rent and token state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub lamports: u64,
}

/// A token account together with its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedTokenAccount {
    pub account: Pubkey,
    pub token: TokenAccount,
}

/// Outcome of a submitted transaction as seen by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Not seen yet, or not at the node's commitment level
    Unknown,
    Failed,
    Succeeded,
}

/// Read-only view of chain state used while composing claims.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// `None` when the account does not exist.
    async fn get_account_info(&self, account: &Pubkey) -> Result<Option<AccountInfo>, ReclaimError>;

    /// `None` when the account does not exist. Anything other than an
    /// initialized SPL token account is an `InvalidTokenAccount` error.
    async fn get_token_account(&self, account: &Pubkey) -> Result<Option<TokenAccount>, ReclaimError>;

    /// SPL token accounts owned by `owner`, decoded from a single listing,
    /// in the order the node returns them.
    async fn find_token_accounts(&self, owner: &Pubkey) -> Result<Vec<KeyedTokenAccount>, ReclaimError>;

    async fn get_signature_status(&self, signature: &Signature) -> Result<SignatureStatus, ReclaimError>;

    /// Blockhash stamped onto transactions handed to the wallet.
    async fn get_latest_blockhash(&self) -> Result<Hash, ReclaimError>;
}

pub fn decode_token_account(
    account: &Pubkey,
    lamports: u64,
    data: &[u8],
) -> Result<TokenAccount, ReclaimError> {
    let state = spl_token::state::Account::unpack(data)
        .map_err(|_| ReclaimError::InvalidTokenAccount(*account))?;
    Ok(TokenAccount {
        mint: state.mint,
        owner: state.owner,
        amount: state.amount,
        lamports,
    })
}

/// Decode one entry of a `jsonParsed` token account listing.
///
/// `account` is the serialized `UiAccount`; anything that is not a parsed
/// SPL token account yields `None`.
pub fn parse_keyed_token_account(pubkey: &str, account: &Value) -> Option<KeyedTokenAccount> {
    if account.pointer("/data/parsed/type")?.as_str()? != "account" {
        return None;
    }
    let info = account.pointer("/data/parsed/info")?;
    Some(KeyedTokenAccount {
        account: pubkey.parse().ok()?,
        token: TokenAccount {
            mint: info.get("mint")?.as_str()?.parse().ok()?,
            owner: info.get("owner")?.as_str()?.parse().ok()?,
            amount: info.pointer("/tokenAmount/amount")?.as_str()?.parse().ok()?,
            lamports: account.get("lamports")?.as_u64()?,
        },
    })
}

#[async_trait]
impl AccountSource for RpcClient {
    async fn get_account_info(&self, account: &Pubkey) -> Result<Option<AccountInfo>, ReclaimError> {
        let response = self
            .get_account_with_commitment(account, self.commitment())
            .await?;
        Ok(response.value.map(|a| AccountInfo {
            lamports: a.lamports,
            owner: a.owner,
        }))
    }

    async fn get_token_account(&self, account: &Pubkey) -> Result<Option<TokenAccount>, ReclaimError> {
        let Some(raw) = self
            .get_account_with_commitment(account, self.commitment())
            .await?
            .value
        else {
            return Ok(None);
        };

        if raw.owner != spl_token::id() {
            return Err(ReclaimError::InvalidTokenAccount(*account));
        }
        decode_token_account(account, raw.lamports, &raw.data).map(Some)
    }

    async fn find_token_accounts(&self, owner: &Pubkey) -> Result<Vec<KeyedTokenAccount>, ReclaimError> {
        let keyed = self
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .await?;

        let mut accounts = Vec::with_capacity(keyed.len());
        for entry in keyed {
            let decoded = serde_json::to_value(&entry.account)
                .ok()
                .and_then(|v| parse_keyed_token_account(&entry.pubkey, &v));
            match decoded {
                Some(account) => accounts.push(account),
                None => tracing::warn!("Skipping undecodable token account {}", entry.pubkey),
            }
        }
        Ok(accounts)
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<SignatureStatus, ReclaimError> {
        Ok(match RpcClient::get_signature_status(self, signature).await? {
            None => SignatureStatus::Unknown,
            Some(Ok(())) => SignatureStatus::Succeeded,
            Some(Err(_)) => SignatureStatus::Failed,
        })
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ReclaimError> {
        Ok(RpcClient::get_latest_blockhash(self).await?)
    }
}

/// Up to `limit` of `owner`'s token accounts that hold no tokens.
pub async fn discover_empty_accounts(
    source: &dyn AccountSource,
    owner: &Pubkey,
    limit: usize,
) -> Result<Vec<KeyedTokenAccount>, ReclaimError> {
    let found = discover(source, owner, limit, |t| t.amount == 0).await?;
    tracing::debug!("Discovered {} empty accounts for {owner}", found.len());
    Ok(found)
}

/// Up to `limit` of `owner`'s token accounts that still hold tokens, the
/// candidates for burn and close.
pub async fn discover_token_accounts_with_balance(
    source: &dyn AccountSource,
    owner: &Pubkey,
    limit: usize,
) -> Result<Vec<KeyedTokenAccount>, ReclaimError> {
    let found = discover(source, owner, limit, |t| t.amount > 0).await?;
    tracing::debug!("Discovered {} accounts with balance for {owner}", found.len());
    Ok(found)
}

async fn discover(
    source: &dyn AccountSource,
    owner: &Pubkey,
    limit: usize,
    keep: impl Fn(&TokenAccount) -> bool,
) -> Result<Vec<KeyedTokenAccount>, ReclaimError> {
    Ok(source
        .find_token_accounts(owner)
        .await?
        .into_iter()
        .filter(|k| k.token.owner == *owner && keep(&k.token))
        .take(limit)
        .collect())
}
