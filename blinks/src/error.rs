use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use solana_client::client_error::ClientError;
use solana_sdk::program_error::ProgramError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::types::ActionError;

/// Failures raised while composing a claim transaction.
#[derive(Debug, Error)]
pub enum ReclaimError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("no accounts supplied for batch close")]
    EmptyBatch,

    #[error("batch of {count} accounts exceeds the limit of {max} per transaction")]
    BatchTooLarge { count: usize, max: usize },

    #[error("account info unavailable for {0}")]
    AccountInfoUnavailable(Pubkey),

    #[error("{0} is not an initialized SPL token account")]
    InvalidTokenAccount(Pubkey),

    #[error("account {account} belongs to {owner}, not the signer")]
    ForeignAccount { account: Pubkey, owner: Pubkey },

    #[error("account {0} holds no tokens; use the zero-balance close path")]
    ZeroBalanceAccount(Pubkey),

    #[error("account {account} still holds {amount} tokens")]
    UnexpectedBalance { account: Pubkey, amount: u64 },

    #[error("wallet holds {available} lamports, at least {required} are needed to pay fees")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("transaction {0} is not confirmed yet")]
    UnconfirmedClaim(Signature),

    #[error("transaction {0} failed on chain")]
    FailedClaim(Signature),

    #[error("{field} must be a finite, non-negative amount of SOL, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to record claim: {0}")]
    Persistence(String),

    #[error("rpc error: {0}")]
    Rpc(#[from] Box<ClientError>),

    #[error("instruction error: {0}")]
    Instruction(#[from] ProgramError),
}

impl From<ClientError> for ReclaimError {
    fn from(e: ClientError) -> Self {
        ReclaimError::Rpc(Box::new(e))
    }
}

/// Errors surfaced over HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Reclaim(#[from] ReclaimError),

    #[error("failed to serialize transaction: {0}")]
    Serialize(#[from] bincode::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Reclaim(e) => match e {
                ReclaimError::AccountInfoUnavailable(_) => StatusCode::NOT_FOUND,
                ReclaimError::UnconfirmedClaim(_) => StatusCode::CONFLICT,
                ReclaimError::Rpc(_) => StatusCode::BAD_GATEWAY,
                ReclaimError::Configuration(_)
                | ReclaimError::Instruction(_)
                | ReclaimError::Persistence(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }
        let body = ActionError {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
