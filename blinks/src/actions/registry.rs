use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;

use super::close::CloseAction;
use super::close_all::CloseAllAction;
use super::close_with_balance::CloseWithBalanceAction;
use crate::error::AppError;
use crate::state::AppState;
use crate::types::{ActionGetResponse, ActionPostResponse};

/// One blink endpoint: a GET card and a POST that returns a transaction.
#[async_trait]
pub trait Action: Send + Sync {
    fn path(&self) -> &'static str;

    async fn metadata(
        &self,
        state: &AppState,
        params: HashMap<String, String>,
    ) -> Result<ActionGetResponse, AppError>;

    async fn execute(
        &self,
        state: &AppState,
        account: Pubkey,
        params: HashMap<String, String>,
    ) -> Result<ActionPostResponse, AppError>;
}

pub struct ActionRegistry {
    actions: HashMap<&'static str, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new(actions: Vec<Arc<dyn Action>>) -> Self {
        Self {
            actions: actions.into_iter().map(|a| (a.path(), a)).collect(),
        }
    }

    pub fn get(&self, path: &str) -> Result<Arc<dyn Action>, AppError> {
        self.actions
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Unknown action '{path}'")))
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new(vec![
            Arc::new(CloseAction),
            Arc::new(CloseWithBalanceAction),
            Arc::new(CloseAllAction),
        ])
    }
}
