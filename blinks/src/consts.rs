pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3001";

/// Owner keeps 65% of the reclaimed rent
pub const DEFAULT_OWNER_SHARE_BPS: u16 = 6_500;
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Compute budget for the zero-balance close path, per closed account
pub const CLOSE_COMPUTE_UNITS: u32 = 3_725;
/// Compute budget for the burn + close path
pub const BURN_CLOSE_COMPUTE_UNITS: u32 = 200_000;
pub const COMPUTE_UNIT_PRICE_MICRO_LAMPORTS: u64 = 150_000;

/// Keeps a compiled claim transaction under the 1232-byte packet limit
pub const MAX_ACCOUNTS_PER_TRANSACTION: usize = 20;

/// Below this the signer cannot be expected to pay the claim's fees (0.001 SOL)
pub const MIN_FEE_PAYER_LAMPORTS: u64 = 1_000_000;
/// Below this a claim is still built, with a warning (0.05 SOL)
pub const LOW_BALANCE_LAMPORTS: u64 = 50_000_000;

/// Accounts listed per wallet by the discovery endpoints
pub const MAX_LISTED_ACCOUNTS: usize = 100;

/// Built claims wait this long for the wallet's confirmation callback
pub const PENDING_CLAIM_TTL_SECS: u64 = 300;
pub const MAX_PENDING_CLAIMS: usize = 10_000;

/// Number of recent claims kept for the dashboard
pub const RECENT_CLAIMS: usize = 50;

/// Icon URL for blink cards
pub const ICON_URL: &str = "https://solreclaim.app/icon.svg";

/// Solana Actions protocol headers
pub const ACTION_VERSION: &str = "2.4";
pub const BLOCKCHAIN_ID: &str = "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1";
