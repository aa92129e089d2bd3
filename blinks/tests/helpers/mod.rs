//! In-memory chain and fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use reclaim_blinks::chain::{AccountInfo, AccountSource, KeyedTokenAccount, SignatureStatus, TokenAccount};
use reclaim_blinks::config::ReclaimConfig;
use reclaim_blinks::error::ReclaimError;
use reclaim_blinks::reclaim::Reclaimer;
use reclaim_blinks::referral::{Referral, StaticReferralDirectory};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Rent-exempt minimum of a 165-byte token account
pub const TOKEN_ACCOUNT_RENT: u64 = 2_039_280;

#[derive(Clone)]
struct Entry {
    info: AccountInfo,
    token: Option<TokenAccount>,
}

/// Chain state held in memory. Every single-account read is logged so
/// tests can assert lookup order.
#[derive(Default)]
pub struct MockChain {
    entries: HashMap<Pubkey, Entry>,
    by_owner: HashMap<Pubkey, Vec<Pubkey>>,
    lookups: Mutex<Vec<Pubkey>>,
    signatures: Mutex<HashMap<Signature, SignatureStatus>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an SPL token account owned by `owner`.
    pub fn token_account(&mut self, owner: &Pubkey, lamports: u64, amount: u64) -> Pubkey {
        let account = Pubkey::new_unique();
        self.entries.insert(
            account,
            Entry {
                info: AccountInfo {
                    lamports,
                    owner: spl_token::id(),
                },
                token: Some(TokenAccount {
                    mint: Pubkey::new_unique(),
                    owner: *owner,
                    amount,
                    lamports,
                }),
            },
        );
        self.by_owner.entry(*owner).or_default().push(account);
        account
    }

    /// Add a plain system account, e.g. a referrer's wallet.
    pub fn wallet(&mut self, lamports: u64) -> Pubkey {
        let wallet = Pubkey::new_unique();
        self.fund(&wallet, lamports);
        wallet
    }

    /// Give `wallet` a system account holding `lamports`.
    pub fn fund(&mut self, wallet: &Pubkey, lamports: u64) {
        self.entries.insert(
            *wallet,
            Entry {
                info: AccountInfo {
                    lamports,
                    owner: solana_sdk::system_program::id(),
                },
                token: None,
            },
        );
    }

    /// Mark a submitted transaction as landed or failed.
    pub fn settle(&self, signature: Signature, status: SignatureStatus) {
        self.signatures.lock().unwrap().insert(signature, status);
    }

    pub fn lookups(&self) -> Vec<Pubkey> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountSource for MockChain {
    async fn get_account_info(&self, account: &Pubkey) -> Result<Option<AccountInfo>, ReclaimError> {
        self.lookups.lock().unwrap().push(*account);
        Ok(self.entries.get(account).map(|e| e.info))
    }

    async fn get_token_account(&self, account: &Pubkey) -> Result<Option<TokenAccount>, ReclaimError> {
        self.lookups.lock().unwrap().push(*account);
        match self.entries.get(account) {
            None => Ok(None),
            Some(entry) => entry
                .token
                .map(Some)
                .ok_or(ReclaimError::InvalidTokenAccount(*account)),
        }
    }

    async fn find_token_accounts(&self, owner: &Pubkey) -> Result<Vec<KeyedTokenAccount>, ReclaimError> {
        let keys = self.by_owner.get(owner).cloned().unwrap_or_default();
        Ok(keys
            .into_iter()
            .filter_map(|account| {
                let token = self.entries.get(&account)?.token?;
                Some(KeyedTokenAccount { account, token })
            })
            .collect())
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<SignatureStatus, ReclaimError> {
        Ok(self
            .signatures
            .lock()
            .unwrap()
            .get(signature)
            .copied()
            .unwrap_or(SignatureStatus::Unknown))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ReclaimError> {
        Ok(Hash::new_from_array([7u8; 32]))
    }
}

pub struct Fixture {
    pub reclaimer: Reclaimer,
    pub chain: Arc<MockChain>,
    pub referrals: Arc<StaticReferralDirectory>,
    pub operator: Pubkey,
}

pub fn fixture(chain: MockChain, referrals: Vec<Referral>) -> Fixture {
    let operator = Pubkey::new_unique();
    let chain = Arc::new(chain);
    let referrals = Arc::new(StaticReferralDirectory::new(referrals));
    let config = ReclaimConfig::new(operator, 6_500).unwrap();
    Fixture {
        reclaimer: Reclaimer::new(config, chain.clone(), referrals.clone()),
        chain,
        referrals,
        operator,
    }
}

pub fn referral(code: &str, wallet: Pubkey, share_percent: u8) -> Referral {
    Referral {
        code: code.into(),
        wallet,
        share_percent,
    }
}

/// Lamports moved by a system transfer instruction.
pub fn transfer_lamports(ix: &Instruction) -> u64 {
    assert_eq!(ix.program_id, solana_sdk::system_program::id());
    assert_eq!(&ix.data[..4], &[2, 0, 0, 0], "not a transfer");
    u64::from_le_bytes(ix.data[4..12].try_into().unwrap())
}

pub fn program_ids(ixs: &[Instruction]) -> Vec<Pubkey> {
    ixs.iter().map(|ix| ix.program_id).collect()
}
