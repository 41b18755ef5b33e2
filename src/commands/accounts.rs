use anyhow::Result;

use crate::client::BankingApi;

use super::pretty;

#[tracing::instrument(skip(api))]
pub async fn validate<A: BankingApi>(api: &A, account_id: &str) -> Result<()> {
    let result = api.validate_account(account_id).await?;
    println!("✓ Account validation result: {}", pretty(&result)?);
    Ok(())
}

#[tracing::instrument(skip(api))]
pub async fn balance<A: BankingApi>(api: &A, account_id: &str) -> Result<()> {
    let result = api.get_account_balance(account_id).await?;
    println!("✓ Account balance: {}", pretty(&result)?);
    Ok(())
}

#[tracing::instrument(skip(api))]
pub async fn list_accounts<A: BankingApi>(api: &A) -> Result<()> {
    let accounts = api.list_accounts().await?;
    println!("✓ Accounts: {}", pretty(&accounts)?);
    Ok(())
}

/// History is always fetched with the bearer token.
#[tracing::instrument(skip(api))]
pub async fn history<A: BankingApi>(api: &A) -> Result<()> {
    let history = api.get_transaction_history(true).await?;
    println!("✓ Transaction history: {}", pretty(&history)?);
    Ok(())
}
