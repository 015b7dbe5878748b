//! HTTP client for a single ledger replica.

use std::time::Duration;

use ledger_types::{Block, ProposedTransaction, Transaction, TxPosition};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when talking to a replica.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint}{path} answered {status}: {body}")]
    Status {
        endpoint: String,
        path: &'static str,
        status: StatusCode,
        body: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetBlockRequest {
    block_num: u64,
}

/// Ledger API client for one endpoint (`host:port`).
#[derive(Clone)]
pub struct LedgerClient {
    client: Client,
    endpoint: String,
}

impl LedgerClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("http://{}{}", self.endpoint, path)
        }
    }

    /// Propose `content`; returns the position the replica committed it at.
    pub async fn propose(&self, content: impl Into<String>) -> Result<TxPosition, ClientError> {
        let response = self
            .client
            .post(self.url("/proposeTransaction"))
            .json(&ProposedTransaction::new(content))
            .send()
            .await?;
        let response = self.check_status(response, "/proposeTransaction", StatusCode::ACCEPTED).await?;
        Ok(response.json().await?)
    }

    /// Fetch a sealed block. `None` when the replica answers 204.
    pub async fn get_block(&self, block_num: u64) -> Result<Option<Block>, ClientError> {
        self.read("/getBlock", &GetBlockRequest { block_num }).await
    }

    /// Fetch a transaction of a sealed block. `None` when the replica answers 204.
    pub async fn get_transaction(
        &self,
        position: TxPosition,
    ) -> Result<Option<Transaction>, ClientError> {
        self.read("/getTransaction", &position).await
    }

    async fn read<B, T>(&self, path: &'static str, body: &B) -> Result<Option<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(self.url(path)).json(body).send().await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let response = self.check_status(response, path, StatusCode::OK).await?;
        Ok(Some(response.json().await?))
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        path: &'static str,
        expected: StatusCode,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            endpoint: self.endpoint.clone(),
            path,
            status,
            body: body.trim().to_string(),
        })
    }
}
