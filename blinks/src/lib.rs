pub mod actions;
pub mod chain;
pub mod config;
pub mod consts;
pub mod cors;
pub mod error;
pub mod history;
pub mod pending;
pub mod program;
pub mod reclaim;
pub mod referral;
pub mod router;
pub mod split;
pub mod state;
pub mod types;
