//! HTTP client for the contract relayer sidecar.
//!
//! The relayer is a small service that holds the organizer signing key,
//! talks to the provider, and exposes the contract operations as plain JSON
//! endpoints. Keeping the key out of this process means the backend only
//! ever speaks HTTP.
//!
//! Endpoints:
//!
//! - `GET  /health`           readiness probes
//! - `POST /mint`             mint a ticket token
//! - `POST /update-metadata`  repoint a token at new metadata
//! - `POST /burn`             destroy a token
//! - `GET  /tokens/{id}`      token URI, used-flag and owner
//! - `GET  /supply`           total tokens minted
//! - `GET  /balance/{addr}`   native balance as a decimal string

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ticketchain_core::chain::{ChainGateway, ChainReceipt, TokenInfo};
use ticketchain_core::error::ChainError;
use ticketchain_core::types::{TokenId, WalletAddress};

/// Connection settings for the relayer sidecar.
#[derive(Debug, Clone)]
pub struct RelayerConfig {
    /// Base URL of the relayer, without a trailing slash.
    pub base_url: String,
    /// Ticket contract the relayer operates on.
    pub contract_address: String,
    /// Per-request timeout. Expiry surfaces as [`ChainError::Unavailable`].
    pub timeout: Duration,
}

/// Chain gateway backed by the relayer sidecar.
pub struct RelayerGateway {
    client: Client,
    base_url: String,
    contract_address: String,
}

#[derive(Serialize)]
struct MintRequest<'a> {
    to: &'a str,
    #[serde(rename = "metadataUri")]
    metadata_uri: &'a str,
    #[serde(rename = "contractAddress")]
    contract_address: &'a str,
}

#[derive(Serialize)]
struct UpdateMetadataRequest<'a> {
    #[serde(rename = "tokenId")]
    token_id: u64,
    #[serde(rename = "metadataUri")]
    metadata_uri: &'a str,
    #[serde(rename = "contractAddress")]
    contract_address: &'a str,
}

#[derive(Serialize)]
struct BurnRequest<'a> {
    #[serde(rename = "tokenId")]
    token_id: u64,
    #[serde(rename = "contractAddress")]
    contract_address: &'a str,
}

#[derive(Deserialize)]
struct HealthResponse {
    ready: bool,
    #[serde(rename = "contractReady")]
    contract_ready: bool,
}

#[derive(Deserialize)]
struct SupplyResponse {
    #[serde(rename = "totalSupply")]
    total_supply: u64,
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: String,
}

impl RelayerGateway {
    /// Build a gateway from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Unavailable`] if the HTTP client cannot be
    /// constructed (TLS backend initialization).
    pub fn new(config: &RelayerConfig) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChainError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            contract_address: config.contract_address.clone(),
        })
    }

    async fn health(&self) -> Result<HealthResponse, ChainError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(ChainError::Unavailable(format!(
                "relayer health check returned {}",
                response.status()
            )));
        }
        response.json::<HealthResponse>().await.map_err(transport)
    }

    /// POST a mutating call and decode the receipt.
    async fn transact<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        token_id: Option<&TokenId>,
    ) -> Result<ChainReceipt, ChainError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::OK => response.json::<ChainReceipt>().await.map_err(transport),
            StatusCode::NOT_FOUND => match token_id {
                Some(id) => Err(ChainError::NotFound(id.clone())),
                None => Err(ChainError::Rejected("unknown token".to_string())),
            },
            status if status.is_client_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(ChainError::Rejected(body))
            }
            status => Err(ChainError::Unavailable(format!(
                "relayer returned {status}"
            ))),
        }
    }

    /// Synthetic token ids never reach the relayer.
    fn on_chain_id(token_id: &TokenId) -> Result<u64, ChainError> {
        token_id
            .as_u64()
            .ok_or_else(|| ChainError::NotFound(token_id.clone()))
    }
}

fn transport(err: reqwest::Error) -> ChainError {
    if err.is_timeout() {
        ChainError::Unavailable("relayer request timed out".to_string())
    } else {
        ChainError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl ChainGateway for RelayerGateway {
    async fn is_ready(&self) -> bool {
        self.health().await.is_ok_and(|h| h.ready)
    }

    async fn is_contract_ready(&self) -> bool {
        self.health().await.is_ok_and(|h| h.contract_ready)
    }

    async fn mint(
        &self,
        recipient: &WalletAddress,
        metadata_uri: &str,
    ) -> Result<ChainReceipt, ChainError> {
        tracing::info!(recipient = %recipient, "relaying mint");
        self.transact(
            "/mint",
            &MintRequest {
                to: recipient.as_str(),
                metadata_uri,
                contract_address: &self.contract_address,
            },
            None,
        )
        .await
    }

    async fn update_metadata(
        &self,
        token_id: &TokenId,
        new_uri: &str,
    ) -> Result<ChainReceipt, ChainError> {
        let id = Self::on_chain_id(token_id)?;
        tracing::info!(token_id = id, "relaying metadata update");
        self.transact(
            "/update-metadata",
            &UpdateMetadataRequest {
                token_id: id,
                metadata_uri: new_uri,
                contract_address: &self.contract_address,
            },
            Some(token_id),
        )
        .await
    }

    async fn burn(&self, token_id: &TokenId) -> Result<ChainReceipt, ChainError> {
        let id = Self::on_chain_id(token_id)?;
        tracing::info!(token_id = id, "relaying burn");
        self.transact(
            "/burn",
            &BurnRequest {
                token_id: id,
                contract_address: &self.contract_address,
            },
            Some(token_id),
        )
        .await
    }

    async fn token_info(&self, token_id: &TokenId) -> Result<TokenInfo, ChainError> {
        let id = Self::on_chain_id(token_id)?;
        let response = self
            .client
            .get(format!("{}/tokens/{id}", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            StatusCode::OK => response.json::<TokenInfo>().await.map_err(transport),
            StatusCode::NOT_FOUND => Err(ChainError::NotFound(token_id.clone())),
            status => Err(ChainError::Unavailable(format!(
                "relayer returned {status}"
            ))),
        }
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        let response = self
            .client
            .get(format!("{}/supply", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(ChainError::Unavailable(format!(
                "relayer returned {}",
                response.status()
            )));
        }
        let supply = response.json::<SupplyResponse>().await.map_err(transport)?;
        Ok(supply.total_supply)
    }

    async fn balance(&self, address: &WalletAddress) -> Result<String, ChainError> {
        let response = self
            .client
            .get(format!("{}/balance/{}", self.base_url, address.as_str()))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(ChainError::Unavailable(format!(
                "relayer returned {}",
                response.status()
            )));
        }
        let balance = response.json::<BalanceResponse>().await.map_err(transport)?;
        Ok(balance.balance)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn request_bodies_use_wire_names() {
        let body = serde_json::to_value(MintRequest {
            to: "0xabc",
            metadata_uri: "{}",
            contract_address: "0xdef",
        })
        .expect("serialize");
        assert_eq!(body["to"], "0xabc");
        assert_eq!(body["metadataUri"], "{}");
        assert_eq!(body["contractAddress"], "0xdef");

        let body = serde_json::to_value(BurnRequest {
            token_id: 7,
            contract_address: "0xdef",
        })
        .expect("serialize");
        assert_eq!(body["tokenId"], 7);
    }

    #[tokio::test]
    async fn synthetic_ids_short_circuit_without_a_request() {
        let gateway = RelayerGateway::new(&RelayerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            contract_address: "0xdef".to_string(),
            timeout: Duration::from_millis(50),
        })
        .expect("client");
        let local = TokenId::synthetic();
        let err = gateway
            .update_metadata(&local, "{}")
            .await
            .expect_err("local ids never hit the wire");
        assert!(matches!(err, ChainError::NotFound(_)));
    }
}
