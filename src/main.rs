use anyhow::Result;
use banking_client::BankingClient;
use banking_client::commands::{self, Action, AuthOptions};
use banking_client::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use banking_client::http::DEFAULT_MAX_RETRIES;
use banking_client::models::{Claim, Credentials};
use banking_client::runtime::RealRuntime;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;

/// banking-client - transfer funds and query accounts on the banking API
///
/// The API base URL defaults to BANKING_API_URL, falling back to
/// http://localhost:8123.
///
/// Examples:
///   banking-client --amount 50                      # ACC1000 -> ACC1001
///   banking-client --use-auth --amount 50           # same, with a bearer token
///   banking-client --validate ACC1000               # check an account exists
///   banking-client --use-auth --history             # authenticated history
#[derive(Parser, Debug)]
#[command(author, version = env!("BANKING_CLIENT_VERSION"), about)]
struct Cli {
    /// Source account ID
    #[arg(long, value_name = "ID", default_value = "ACC1000")]
    from_account: String,

    /// Destination account ID
    #[arg(long, value_name = "ID", default_value = "ACC1001")]
    to_account: String,

    /// Transfer amount
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    amount: f64,

    /// Banking API base URL (defaults to BANKING_API_URL or http://localhost:8123)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Obtain a JWT first and send it with the request
    #[arg(long)]
    use_auth: bool,

    /// Validate an account instead of transferring
    #[arg(long, value_name = "ID")]
    validate: Option<String>,

    /// Show an account balance instead of transferring
    #[arg(long, value_name = "ID")]
    balance: Option<String>,

    /// List all accounts
    #[arg(long)]
    list_accounts: bool,

    /// Show transaction history (requires --use-auth)
    #[arg(long)]
    history: bool,

    /// Token scope requested with --use-auth (enquiry or transfer)
    #[arg(long, value_name = "CLAIM", default_value = "transfer")]
    claim: Claim,

    /// Username for --use-auth
    #[arg(long, env = "BANKING_USERNAME", default_value = "bob")]
    username: String,

    /// Password for --use-auth
    #[arg(
        long,
        env = "BANKING_PASSWORD",
        default_value = "secret",
        hide_env_values = true,
        hide_default_value = true
    )]
    password: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Retries for transient failures (429, 5xx, connection errors)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: usize,
}

impl Cli {
    fn action(&self) -> Action {
        if let Some(account_id) = &self.validate {
            Action::Validate(account_id.clone())
        } else if let Some(account_id) = &self.balance {
            Action::Balance(account_id.clone())
        } else if self.list_accounts {
            Action::ListAccounts
        } else if self.history {
            Action::History
        } else {
            Action::Transfer {
                from_account: self.from_account.clone(),
                to_account: self.to_account.clone(),
                amount: self.amount,
            }
        }
    }

    fn auth(&self) -> Option<AuthOptions> {
        self.use_auth.then(|| AuthOptions {
            credentials: Credentials::new(&self.username, &self.password),
            claim: self.claim,
        })
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::resolve(&RealRuntime, self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_retries(self.max_retries)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut client = BankingClient::new(cli.config())?;
    commands::run(&mut client, cli.action(), cli.auth()).await
}
