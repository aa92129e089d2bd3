pub mod close;
pub mod close_all;
pub mod close_with_balance;
pub mod confirm;
mod registry;
mod utils;

pub use registry::{Action, ActionRegistry};
pub use utils::{
    carry_ref, claim_response, get_optional_param, get_param, low_balance_note, parse_pubkey,
    referral_code, with_query,
};
