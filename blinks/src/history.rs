use async_trait::async_trait;
use serde::{Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::consts::RECENT_CLAIMS;
use crate::error::ReclaimError;
use crate::referral::ReferralDirectory;

/// SOL amounts entering the ledgers must be finite and non-negative.
pub fn require_sol_amount(field: &'static str, value: f64) -> Result<(), ReclaimError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ReclaimError::InvalidAmount { field, value });
    }
    Ok(())
}

fn as_string<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// One confirmed claim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimRecord {
    #[serde(rename = "wallet_address", serialize_with = "as_string")]
    pub owner: Pubkey,
    #[serde(rename = "transaction_id", serialize_with = "as_string")]
    pub signature: Signature,
    pub sol_received: f64,
    pub sol_shared: f64,
    pub accounts_closed: usize,
    /// Unix seconds
    pub claimed_at: u64,
}

impl ClaimRecord {
    pub fn new(
        owner: Pubkey,
        signature: Signature,
        sol_received: f64,
        sol_shared: f64,
        accounts_closed: usize,
    ) -> Self {
        let claimed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            owner,
            signature,
            sol_received,
            sol_shared,
            accounts_closed,
            claimed_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimStats {
    pub total_sol_claimed: f64,
    pub total_sol_shared: f64,
    pub total_accounts_closed: u64,
    pub total_claims: u64,
}

#[async_trait]
pub trait ClaimHistory: Send + Sync {
    async fn store_claim_transaction(&self, record: ClaimRecord) -> Result<(), ReclaimError>;

    async fn stats(&self) -> ClaimStats;

    /// Most recent claims first.
    async fn latest(&self, limit: usize) -> Vec<ClaimRecord>;
}

#[derive(Debug, Default)]
struct Ledger {
    stats: ClaimStats,
    recent: VecDeque<ClaimRecord>,
}

/// Process-local history; keeps running totals and the last few claims.
#[derive(Debug, Default)]
pub struct MemoryClaimHistory {
    ledger: Mutex<Ledger>,
}

impl MemoryClaimHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimHistory for MemoryClaimHistory {
    async fn store_claim_transaction(&self, record: ClaimRecord) -> Result<(), ReclaimError> {
        require_sol_amount("sol_received", record.sol_received)?;
        require_sol_amount("sol_shared", record.sol_shared)?;

        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| ReclaimError::Persistence("claim history poisoned".into()))?;

        if ledger.recent.iter().any(|r| r.signature == record.signature) {
            tracing::debug!("Claim {} already recorded", record.signature);
            return Ok(());
        }

        ledger.stats.total_sol_claimed += record.sol_received;
        ledger.stats.total_sol_shared += record.sol_shared;
        ledger.stats.total_accounts_closed += record.accounts_closed as u64;
        ledger.stats.total_claims += 1;

        ledger.recent.push_front(record);
        ledger.recent.truncate(RECENT_CLAIMS);
        Ok(())
    }

    async fn stats(&self) -> ClaimStats {
        self.ledger
            .lock()
            .map(|l| l.stats.clone())
            .unwrap_or_default()
    }

    async fn latest(&self, limit: usize) -> Vec<ClaimRecord> {
        self.ledger
            .lock()
            .map(|l| l.recent.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}

/// Record a landed claim and credit its referrer without blocking the caller.
///
/// The rent has already moved on-chain by the time this runs, so failures are
/// logged and dropped.
pub fn record_claim(
    history: Arc<dyn ClaimHistory>,
    referrals: Arc<dyn ReferralDirectory>,
    record: ClaimRecord,
    referrer: Option<Pubkey>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let signature = record.signature;
        let sol_shared = record.sol_shared;

        if let Err(e) = history.store_claim_transaction(record).await {
            tracing::error!("Failed to store claim {signature}: {e}");
        }

        if let Some(referrer) = referrer.filter(|_| sol_shared > 0.0) {
            if let Err(e) = referrals.update_affiliated_wallet(&referrer, sol_shared).await {
                tracing::error!("Failed to credit referrer {referrer} for {signature}: {e}");
            }
        }
    })
}
