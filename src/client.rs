//! Banking API client: one method per remote operation.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Value, json};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{BankingError, BankingResult};
use crate::http::HttpClient;
use crate::models::{Claim, Credentials, TransferRequest, TransferResponse};

/// Operations exposed by the banking API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankingApi: Send + Sync {
    async fn authenticate(
        &mut self,
        credentials: &Credentials,
        claim: Claim,
    ) -> BankingResult<String>;
    async fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
        use_auth: bool,
    ) -> BankingResult<TransferResponse>;
    async fn validate_account(&self, account_id: &str) -> BankingResult<Value>;
    async fn get_account_balance(&self, account_id: &str) -> BankingResult<Value>;
    async fn list_accounts(&self) -> BankingResult<Value>;
    async fn get_transaction_history(&self, use_auth: bool) -> BankingResult<Value>;
}

/// Stateful client holding the connection pool and, once authenticated, a bearer token.
pub struct BankingClient {
    base_url: String,
    base: Url,
    timeout: Duration,
    http: HttpClient,
    token: Option<String>,
    token_claim: Option<Claim>,
}

impl BankingClient {
    #[tracing::instrument]
    pub fn new(config: ClientConfig) -> BankingResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            BankingError::Configuration(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .user_agent(concat!("banking-client/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| BankingError::Configuration(e.to_string()))?;

        info!("Initialized BankingClient with base URL: {}", config.base_url);

        Ok(Self {
            base_url: config.base_url,
            base,
            timeout: config.timeout,
            http: HttpClient::new(client, config.retry),
            token: None,
            token_claim: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn token_claim(&self) -> Option<Claim> {
        self.token_claim
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Obtains a token for `claim` and keeps it for later authenticated calls.
    #[tracing::instrument(skip(self, credentials))]
    pub async fn authenticate(
        &mut self,
        credentials: &Credentials,
        claim: Claim,
    ) -> BankingResult<String> {
        info!("Authenticating with claim: {}", claim);

        let endpoint = format!("/authToken?claim={}", claim);
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let response = self
            .request(Method::POST, &endpoint, Some(&body), false)
            .await?;

        let token = extract_token(&response).ok_or_else(|| {
            BankingError::Authentication(format!("No token received in response: {}", response))
        })?;

        debug!("Received token {}", mask_token(&token));
        self.token = Some(token.clone());
        self.token_claim = Some(claim);
        info!("Authentication successful");
        Ok(token)
    }

    /// Validates the input, then posts the transfer. Anything but a SUCCESS
    /// status is a [`BankingError::Transfer`].
    #[tracing::instrument(skip(self))]
    pub async fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
        use_auth: bool,
    ) -> BankingResult<TransferResponse> {
        let request = TransferRequest::new(from_account, to_account, amount).inspect_err(|e| {
            error!("Invalid transfer request: {}", e);
        })?;
        self.submit_transfer(&request, use_auth).await
    }

    /// Posts an already validated transfer request.
    #[tracing::instrument(skip(self))]
    pub async fn submit_transfer(
        &self,
        request: &TransferRequest,
        use_auth: bool,
    ) -> BankingResult<TransferResponse> {
        info!(
            "Transferring {} from {} to {}",
            request.amount(),
            request.from_account(),
            request.to_account()
        );

        let data = self
            .request(Method::POST, "/transfer", Some(&request.to_json()), use_auth)
            .await?;
        let response = TransferResponse::from_json(&data);

        if !response.is_success() {
            let message = response
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Transfer failed".to_string());
            warn!("Transfer failed: {}", message);
            return Err(BankingError::Transfer(message));
        }

        info!(
            "Transfer successful: {}",
            response.transaction_id.as_deref().unwrap_or("<no id>")
        );
        Ok(response)
    }

    #[tracing::instrument(skip(self))]
    pub async fn validate_account(&self, account_id: &str) -> BankingResult<Value> {
        require_account_id(account_id)?;
        info!("Validating account: {}", account_id);

        let endpoint = format!("/accounts/validate/{}", account_id);
        self.request(Method::GET, &endpoint, None, false)
            .await
            .inspect_err(|e| error!("Account validation failed: {}", e))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_account_balance(&self, account_id: &str) -> BankingResult<Value> {
        require_account_id(account_id)?;
        info!("Getting balance for account: {}", account_id);

        let endpoint = format!("/accounts/balance/{}", account_id);
        self.request(Method::GET, &endpoint, None, false)
            .await
            .inspect_err(|e| error!("Failed to get account balance: {}", e))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_accounts(&self) -> BankingResult<Value> {
        info!("Listing all accounts");
        self.request(Method::GET, "/accounts", None, false)
            .await
            .inspect_err(|e| error!("Failed to list accounts: {}", e))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_transaction_history(&self, use_auth: bool) -> BankingResult<Value> {
        info!("Getting transaction history");
        self.request(Method::GET, "/transactions/history", None, use_auth)
            .await
            .inspect_err(|e| error!("Failed to get transaction history: {}", e))
    }

    /// Sends one request and converts the outcome into JSON or a [`BankingError`].
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        require_auth: bool,
    ) -> BankingResult<Value> {
        let url = self.base.join(endpoint).map_err(|e| {
            BankingError::Request(format!("invalid endpoint '{}': {}", endpoint, e))
        })?;
        let headers = self.headers(require_auth)?;

        debug!("Making {} request to {}", method, url);
        let response = self
            .http
            .send(method.clone(), url.clone(), headers, body)
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if self.http.gave_up_on(&method, status) {
            let err = BankingError::Request(format!(
                "Max retries exceeded with url: {} (too many {} error responses)",
                url.path(),
                status.as_u16()
            ));
            error!("{}", err);
            return Err(err);
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.reqwest_error(&e))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(BankingError::Authentication(format!(
                "Authentication failed: {}",
                text
            )));
        }

        if !status.is_success() {
            let err = BankingError::Http { status, body: text };
            error!("{}", err);
            return Err(err);
        }

        Ok(parse_body(text))
    }

    fn headers(&self, require_auth: bool) -> BankingResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if require_auth {
            let token = self.token.as_deref().ok_or_else(|| {
                BankingError::Authentication(
                    "Authentication required but no token available. Call authenticate() first."
                        .to_string(),
                )
            })?;
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                BankingError::Authentication(
                    "Stored token cannot be sent as an Authorization header".to_string(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn transport_error(&self, error: reqwest_middleware::Error) -> BankingError {
        match error {
            reqwest_middleware::Error::Reqwest(e) => self.reqwest_error(&e),
            // reqwest-retry wraps the final failure together with the retry count
            reqwest_middleware::Error::Middleware(e) => {
                for cause in e.chain() {
                    if let Some(inner) = cause.downcast_ref::<reqwest::Error>() {
                        return self.reqwest_error(inner);
                    }
                    if let Some(reqwest_middleware::Error::Reqwest(inner)) =
                        cause.downcast_ref::<reqwest_middleware::Error>()
                    {
                        return self.reqwest_error(inner);
                    }
                }
                BankingError::Request(format!("{:#}", e))
            }
        }
    }

    fn reqwest_error(&self, error: &reqwest::Error) -> BankingError {
        if error.is_timeout() {
            BankingError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else if error.is_connect() {
            BankingError::Connection {
                base_url: self.base_url.clone(),
                reason: error.to_string(),
            }
        } else {
            BankingError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl BankingApi for BankingClient {
    async fn authenticate(
        &mut self,
        credentials: &Credentials,
        claim: Claim,
    ) -> BankingResult<String> {
        BankingClient::authenticate(self, credentials, claim).await
    }

    async fn transfer(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
        use_auth: bool,
    ) -> BankingResult<TransferResponse> {
        BankingClient::transfer(self, from_account, to_account, amount, use_auth).await
    }

    async fn validate_account(&self, account_id: &str) -> BankingResult<Value> {
        BankingClient::validate_account(self, account_id).await
    }

    async fn get_account_balance(&self, account_id: &str) -> BankingResult<Value> {
        BankingClient::get_account_balance(self, account_id).await
    }

    async fn list_accounts(&self) -> BankingResult<Value> {
        BankingClient::list_accounts(self).await
    }

    async fn get_transaction_history(&self, use_auth: bool) -> BankingResult<Value> {
        BankingClient::get_transaction_history(self, use_auth).await
    }
}

fn require_account_id(account_id: &str) -> BankingResult<()> {
    if account_id.is_empty() {
        return Err(BankingError::Validation(
            "account_id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// First non-empty `token` or `access_token` string in the response.
fn extract_token(response: &Value) -> Option<String> {
    ["token", "access_token"]
        .iter()
        .filter_map(|key| response.get(*key).and_then(Value::as_str))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// Non-JSON bodies are wrapped instead of rejected.
fn parse_body(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => {
            warn!("Non-JSON response: {}", text);
            json!({ "raw_response": text })
        }
    }
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
