use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::consts::{MAX_PENDING_CLAIMS, PENDING_CLAIM_TTL_SECS};
use crate::error::ReclaimError;
use crate::reclaim::ClaimTransaction;

/// A claim handed to a wallet and not yet confirmed. The amounts recorded on
/// confirmation come from here, never from the callback.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingClaim {
    pub owner: Pubkey,
    /// Serialized message the owner is asked to sign
    pub message: Vec<u8>,
    pub sol_received: f64,
    pub sol_shared: Option<f64>,
    pub referrer: Option<Pubkey>,
    pub accounts_closed: usize,
}

impl PendingClaim {
    pub fn new(claim: &ClaimTransaction, blockhash: &Hash) -> Self {
        Self {
            owner: claim.owner,
            message: claim.message(blockhash).serialize(),
            sol_received: claim.sol_received,
            sol_shared: claim.sol_shared,
            referrer: claim.referrer,
            accounts_closed: claim.accounts_closed(),
        }
    }

    /// Whether `signature` is the owner's signature over this exact message.
    pub fn signed_by_owner(&self, signature: &Signature) -> bool {
        signature.verify(self.owner.as_ref(), &self.message)
    }
}

/// Claims waiting for the wallet's chained confirmation, keyed by an opaque
/// random id carried in the confirm link.
pub struct PendingClaims {
    claims: Mutex<HashMap<String, (Instant, PendingClaim)>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for PendingClaims {
    fn default() -> Self {
        Self::new(Duration::from_secs(PENDING_CLAIM_TTL_SECS), MAX_PENDING_CLAIMS)
    }
}

impl PendingClaims {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            claims: Mutex::default(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&self, claim: PendingClaim) -> Result<String, ReclaimError> {
        let id = bs58::encode(rand::random::<[u8; 16]>()).into_string();
        let mut claims = self.lock()?;

        let ttl = self.ttl;
        claims.retain(|_, (created, _)| created.elapsed() < ttl);
        if claims.len() >= self.capacity {
            let oldest = claims
                .iter()
                .min_by_key(|(_, (created, _))| *created)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                tracing::warn!("Pending claims full, evicting {oldest}");
                claims.remove(&oldest);
            }
        }

        claims.insert(id.clone(), (Instant::now(), claim));
        Ok(id)
    }

    /// The claim behind `id`, unless it expired.
    pub fn get(&self, id: &str) -> Result<Option<PendingClaim>, ReclaimError> {
        let claims = self.lock()?;
        Ok(claims
            .get(id)
            .filter(|(created, _)| created.elapsed() < self.ttl)
            .map(|(_, claim)| claim.clone()))
    }

    /// Remove `id`; `false` when another confirmation already took it.
    pub fn complete(&self, id: &str) -> Result<bool, ReclaimError> {
        Ok(self.lock()?.remove(id).is_some())
    }

    pub fn len(&self) -> usize {
        self.claims.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, (Instant, PendingClaim)>>, ReclaimError> {
        self.claims
            .lock()
            .map_err(|_| ReclaimError::Persistence("pending claims poisoned".into()))
    }
}
