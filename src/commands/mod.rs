//! CLI actions, written against [`BankingApi`] so they can run on a mock.

use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;

use crate::client::BankingApi;
use crate::models::{Claim, Credentials};

mod accounts;
mod transfer;

pub use accounts::{balance, history, list_accounts, validate};
pub use transfer::{format_transfer, transfer};

/// What the CLI was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Transfer {
        from_account: String,
        to_account: String,
        amount: f64,
    },
    Validate(String),
    Balance(String),
    ListAccounts,
    History,
}

/// Credentials and scope used when `--use-auth` is given.
#[derive(Debug, Clone, Default)]
pub struct AuthOptions {
    pub credentials: Credentials,
    pub claim: Claim,
}

/// Authenticates if requested, then runs `action`.
#[tracing::instrument(skip(api, auth))]
pub async fn run<A: BankingApi>(
    api: &mut A,
    action: Action,
    auth: Option<AuthOptions>,
) -> Result<()> {
    let use_auth = auth.is_some();
    if let Some(auth) = auth {
        debug!("Authenticating as {}", auth.credentials.username);
        api.authenticate(&auth.credentials, auth.claim).await?;
        println!("✓ Authentication successful");
    }

    match action {
        Action::Transfer {
            from_account,
            to_account,
            amount,
        } => transfer(api, &from_account, &to_account, amount, use_auth).await,
        Action::Validate(account_id) => validate(api, &account_id).await,
        Action::Balance(account_id) => balance(api, &account_id).await,
        Action::ListAccounts => list_accounts(api).await,
        Action::History => history(api).await,
    }
}

pub(crate) fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to format JSON response")
}
