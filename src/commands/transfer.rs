use anyhow::Result;

use crate::client::BankingApi;
use crate::models::TransferResponse;

/// Transfer funds and print the receipt.
#[tracing::instrument(skip(api))]
pub async fn transfer<A: BankingApi>(
    api: &A,
    from_account: &str,
    to_account: &str,
    amount: f64,
    use_auth: bool,
) -> Result<()> {
    let response = api
        .transfer(from_account, to_account, amount, use_auth)
        .await?;
    println!("{}", format_transfer(&response));
    Ok(())
}

/// Human-readable receipt for a completed transfer.
pub fn format_transfer(response: &TransferResponse) -> String {
    let amount = response
        .amount
        .map(|a| format!("${:.2}", a))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "✓ Transfer successful!\n  Transaction ID: {}\n  Status: {}\n  Message: {}\n  Amount: {}",
        response.transaction_id.as_deref().unwrap_or("n/a"),
        response.status.as_deref().unwrap_or("n/a"),
        response.message.as_deref().unwrap_or("n/a"),
        amount
    )
}
