//! Three-way division of reclaimed rent between the account owner, the
//! operator, and an optional referrer.
//!
//! The owner's cut is floored, the referrer's cut is rounded half-up, and the
//! operator takes whatever remains, so the three parts always add back up to
//! the total.

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
#[allow(deprecated)]
use solana_sdk::system_instruction;

use crate::consts::BPS_DENOMINATOR;
use crate::referral::Referral;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    pub total: u64,
    pub owner_share: u64,
    pub operator_share: u64,
    pub referrer_share: u64,
}

impl FeeSplit {
    /// `referral` must already be known to point at a live account.
    pub fn compute(total: u64, owner_share_bps: u16, referral: Option<&Referral>) -> Self {
        let owner_share = (total as u128 * owner_share_bps as u128 / BPS_DENOMINATOR as u128) as u64;
        let remaining = total - owner_share;

        let referrer_share = referral
            .map(|r| referrer_cut(remaining, r.share_percent))
            .unwrap_or(0);

        Self {
            total,
            owner_share,
            operator_share: remaining - referrer_share,
            referrer_share,
        }
    }

    /// Zero-or-one referrer transfer, then the operator transfer. Both are
    /// paid by `owner` out of the rent the preceding closes released.
    #[allow(deprecated)]
    pub fn transfer_instructions(
        &self,
        owner: &Pubkey,
        operator: &Pubkey,
        referrer: Option<&Pubkey>,
    ) -> Vec<Instruction> {
        let mut ixs = Vec::with_capacity(2);
        if let Some(referrer) = referrer {
            ixs.push(system_instruction::transfer(owner, referrer, self.referrer_share));
        }
        ixs.push(system_instruction::transfer(owner, operator, self.operator_share));
        ixs
    }
}

/// round(remaining * percent / 100), halves rounded up.
fn referrer_cut(remaining: u64, percent: u8) -> u64 {
    let percent = percent.min(100) as u128;
    ((remaining as u128 * percent + 50) / 100) as u64
}
