//! Request and response models for the banking API.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{BankingError, BankingResult};

/// Status value the server reports for a completed transfer.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// A validated fund transfer between two accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    from_account: String,
    to_account: String,
    amount: f64,
}

impl TransferRequest {
    /// Builds a transfer request, rejecting empty account ids, non-positive
    /// amounts and transfers from an account to itself.
    pub fn new(
        from_account: impl Into<String>,
        to_account: impl Into<String>,
        amount: f64,
    ) -> BankingResult<Self> {
        let from_account = from_account.into();
        let to_account = to_account.into();

        if from_account.is_empty() {
            return Err(BankingError::Validation(
                "from_account must be a non-empty string".to_string(),
            ));
        }
        if to_account.is_empty() {
            return Err(BankingError::Validation(
                "to_account must be a non-empty string".to_string(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BankingError::Validation(
                "amount must be greater than 0".to_string(),
            ));
        }
        if from_account == to_account {
            return Err(BankingError::Validation(
                "from_account and to_account cannot be the same".to_string(),
            ));
        }

        Ok(Self {
            from_account,
            to_account,
            amount,
        })
    }

    pub fn from_account(&self) -> &str {
        &self.from_account
    }

    pub fn to_account(&self) -> &str {
        &self.to_account
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// JSON body sent to `POST /transfer`.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "fromAccount": self.from_account,
            "toAccount": self.to_account,
            "amount": round_cents(self.amount),
        })
    }
}

/// Above this magnitude an `f64` has no fractional cents left to round.
const WHOLE_CENTS_LIMIT: f64 = 9_007_199_254_740_992.0 / 100.0;

/// Rounds to 2 decimal places, half away from zero.
pub fn round_cents(amount: f64) -> f64 {
    if !amount.is_finite() || amount.abs() >= WHOLE_CENTS_LIMIT {
        return amount;
    }
    (amount * 100.0).round() / 100.0
}

/// Transfer result as reported by the server. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub transaction_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: Option<f64>,
}

impl TransferResponse {
    /// Extracts whatever fields are present. Missing or mistyped keys are
    /// left as `None`; this never fails.
    pub fn from_json(data: &Value) -> Self {
        Self {
            transaction_id: string_field(data, "transactionId"),
            status: string_field(data, "status"),
            message: string_field(data, "message"),
            from_account: string_field(data, "fromAccount"),
            to_account: string_field(data, "toAccount"),
            amount: data.get("amount").and_then(Value::as_f64),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

/// Reads a string field, accepting numbers as well (some servers send numeric ids).
fn string_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Scope requested when obtaining a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Claim {
    Enquiry,
    #[default]
    Transfer,
}

impl Claim {
    pub fn as_str(&self) -> &'static str {
        match self {
            Claim::Enquiry => "enquiry",
            Claim::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Claim {
    type Err = BankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enquiry" => Ok(Claim::Enquiry),
            "transfer" => Ok(Claim::Transfer),
            other => Err(BankingError::Validation(format!(
                "Invalid claim '{}'. Expected 'enquiry' or 'transfer'.",
                other
            ))),
        }
    }
}

/// Username and password sent to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("bob", "secret")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}
