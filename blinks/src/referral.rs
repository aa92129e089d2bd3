use async_trait::async_trait;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::ReclaimError;
use crate::history::require_sol_amount;

/// A referrer entitled to part of the operator's cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referral {
    pub code: String,
    pub wallet: Pubkey,
    /// 0..=100, taken from what is left after the owner's share
    pub share_percent: u8,
}

/// Affiliate directory the claim flow consults. Lookups fail open: any
/// problem resolving a code is reported as "no referral".
#[async_trait]
pub trait ReferralDirectory: Send + Sync {
    async fn resolve_referral(&self, code: &str) -> Option<Referral>;

    /// Credit `sol_shared` to the referrer once a claim has landed.
    async fn update_affiliated_wallet(
        &self,
        referrer: &Pubkey,
        sol_shared: f64,
    ) -> Result<(), ReclaimError>;
}

#[derive(Debug, Deserialize)]
struct AffiliateEntry {
    code: String,
    wallet_address: String,
    share: u8,
}

/// Directory loaded once from a JSON list of
/// `{"code", "wallet_address", "share"}` entries.
#[derive(Debug, Default)]
pub struct StaticReferralDirectory {
    by_code: HashMap<String, Referral>,
    shared: Mutex<HashMap<Pubkey, f64>>,
}

impl StaticReferralDirectory {
    pub fn new(referrals: impl IntoIterator<Item = Referral>) -> Self {
        Self {
            by_code: referrals.into_iter().map(|r| (r.code.clone(), r)).collect(),
            shared: Mutex::default(),
        }
    }

    /// Entries with an unparsable wallet or a share above 100% are dropped.
    pub fn from_json(json: &str) -> Result<Self, ReclaimError> {
        let entries: Vec<AffiliateEntry> = serde_json::from_str(json)
            .map_err(|e| ReclaimError::Configuration(format!("invalid affiliate list: {e}")))?;

        let mut referrals = Vec::with_capacity(entries.len());
        for entry in entries {
            let Ok(wallet) = entry.wallet_address.parse::<Pubkey>() else {
                tracing::warn!("Affiliate '{}' has an invalid wallet, skipping", entry.code);
                continue;
            };
            if entry.share > 100 {
                tracing::warn!("Affiliate '{}' share {}% exceeds 100, skipping", entry.code, entry.share);
                continue;
            }
            referrals.push(Referral {
                code: entry.code,
                wallet,
                share_percent: entry.share,
            });
        }
        Ok(Self::new(referrals))
    }

    pub fn load(path: &Path) -> Result<Self, ReclaimError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReclaimError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Total SOL credited to `referrer` so far.
    pub fn shared_with(&self, referrer: &Pubkey) -> f64 {
        self.shared
            .lock()
            .map(|m| m.get(referrer).copied().unwrap_or(0.0))
            .unwrap_or(0.0)
    }
}

#[async_trait]
impl ReferralDirectory for StaticReferralDirectory {
    async fn resolve_referral(&self, code: &str) -> Option<Referral> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let found = self.by_code.get(code).cloned();
        if found.is_none() {
            tracing::debug!("Unknown referral code '{code}'");
        }
        found
    }

    async fn update_affiliated_wallet(
        &self,
        referrer: &Pubkey,
        sol_shared: f64,
    ) -> Result<(), ReclaimError> {
        require_sol_amount("sol_shared", sol_shared)?;
        let mut shared = self
            .shared
            .lock()
            .map_err(|_| ReclaimError::Persistence("affiliate ledger poisoned".into()))?;
        *shared.entry(*referrer).or_insert(0.0) += sol_shared;
        Ok(())
    }
}
