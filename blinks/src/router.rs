use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

use crate::actions::{self, confirm};
use crate::chain::{self, KeyedTokenAccount};
use crate::consts::MAX_LISTED_ACCOUNTS;
use crate::cors;
use crate::error::AppError;
use crate::history::{ClaimRecord, ClaimStats};
use crate::state::AppState;
use crate::types::*;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/actions.json", get(actions_json))
        .route("/api/actions/confirm", post(confirm_action))
        .route("/api/actions/{action}", get(get_action).post(post_action))
        .route("/api/accounts/{owner}/empty", get(empty_accounts))
        .route("/api/accounts/{owner}/with-balance", get(accounts_with_balance))
        .route("/api/claims", get(claims))
        .layer(middleware::map_response(cors::action_headers))
        .layer(cors::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn actions_json() -> Json<ActionsJson> {
    Json(ActionsJson {
        rules: vec![ActionRule {
            path_pattern: "/api/actions/**".into(),
            api_path: "/api/actions/**".into(),
        }],
    })
}

async fn get_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ActionGetResponse>, AppError> {
    let handler = state.registry.get(&action)?;
    Ok(Json(handler.metadata(&state, params).await?))
}

async fn post_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<ActionPostRequest>,
) -> Result<Json<ActionPostResponse>, AppError> {
    let handler = state.registry.get(&action)?;
    let account = actions::parse_pubkey(&body.account, "account")?;
    tracing::info!("{action} requested by {account}");
    Ok(Json(handler.execute(&state, account, params).await?))
}

async fn confirm_action(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<NextActionPostRequest>,
) -> Result<Json<ActionGetResponse>, AppError> {
    Ok(Json(confirm::confirm(&state, body, &params).await?))
}

#[derive(Serialize)]
struct TokenAccountView {
    pubkey: String,
    mint: String,
    amount: u64,
    lamports: u64,
}

impl From<KeyedTokenAccount> for TokenAccountView {
    fn from(k: KeyedTokenAccount) -> Self {
        Self {
            pubkey: k.account.to_string(),
            mint: k.token.mint.to_string(),
            amount: k.token.amount,
            lamports: k.token.lamports,
        }
    }
}

#[derive(Serialize)]
struct TokenAccountsResponse {
    accounts: Vec<TokenAccountView>,
}

async fn empty_accounts(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<TokenAccountsResponse>, AppError> {
    let owner: Pubkey = actions::parse_pubkey(&owner, "owner")?;
    let found =
        chain::discover_empty_accounts(state.reclaimer.source(), &owner, MAX_LISTED_ACCOUNTS)
            .await?;

    Ok(Json(TokenAccountsResponse {
        accounts: found.into_iter().map(TokenAccountView::from).collect(),
    }))
}

/// Accounts that still hold tokens, each a `close-with-balance` candidate.
async fn accounts_with_balance(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<TokenAccountsResponse>, AppError> {
    let owner: Pubkey = actions::parse_pubkey(&owner, "owner")?;
    let found = chain::discover_token_accounts_with_balance(
        state.reclaimer.source(),
        &owner,
        MAX_LISTED_ACCOUNTS,
    )
    .await?;

    Ok(Json(TokenAccountsResponse {
        accounts: found.into_iter().map(TokenAccountView::from).collect(),
    }))
}

#[derive(Serialize)]
struct ClaimsResponse {
    #[serde(flatten)]
    stats: ClaimStats,
    latest: Vec<ClaimRecord>,
}

async fn claims(State(state): State<AppState>) -> Json<ClaimsResponse> {
    Json(ClaimsResponse {
        stats: state.history.stats().await,
        latest: state.history.latest(20).await,
    })
}
