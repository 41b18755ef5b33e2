//! Client for a remote banking API: authentication, transfers, account
//! lookups and transaction history over JSON/HTTP.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod runtime;

pub use client::{BankingApi, BankingClient};
pub use config::ClientConfig;
pub use error::{BankingError, BankingResult};
pub use models::{Claim, Credentials, TransferRequest, TransferResponse};
