//! Chain gateway trait: the wrapper around the deployed ticket contract.
//!
//! The gateway translates lifecycle intents (mint, metadata update, burn)
//! into calls against the external ledger and normalizes results and errors.
//! Callers consult the readiness probes before mutating operations and apply
//! the local-fallback / best-effort policies described in the lifecycle
//! manager; the gateway itself never swallows a failure.
//!
//! # Implementations
//!
//! - `SimulatedChain` (in `ticketchain-gateway`): deterministic in-process
//!   chain for the demo variant and tests
//! - `RelayerGateway` (in `ticketchain-gateway`): HTTP client for the
//!   contract relayer sidecar that holds the organizer key

use crate::error::ChainError;
use crate::types::{TokenId, WalletAddress};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Confirmation returned by a mutating chain call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReceipt {
    /// Token the transaction concerned (assigned by the contract for mints).
    #[serde(rename = "tokenId")]
    pub token_id: TokenId,
    /// Transaction hash.
    #[serde(rename = "transactionHash")]
    pub tx_hash: String,
    /// Block the transaction was confirmed in.
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    /// Gas consumed.
    #[serde(rename = "gasUsed")]
    pub gas_used: u64,
}

/// Read-only on-chain view of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token identifier.
    #[serde(rename = "tokenId")]
    pub token_id: TokenId,
    /// Current metadata pointer.
    #[serde(rename = "tokenURI")]
    pub uri: String,
    /// Whether the contract marks the ticket as consumed.
    #[serde(rename = "isUsed")]
    pub is_used: bool,
    /// Current owner.
    pub owner: WalletAddress,
}

/// Wrapper issuing calls against the external ledger.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Whether the gateway is configured with a provider and signing key.
    async fn is_ready(&self) -> bool;

    /// Whether the contract is deployed and callable.
    async fn is_contract_ready(&self) -> bool;

    /// Mint a ticket token to `recipient` with the given metadata payload.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotReady`] without a network call when the gateway is
    /// unconfigured; [`ChainError::Rejected`] for reverted transactions;
    /// [`ChainError::Unavailable`] when the network cannot be reached
    /// (including bounded-timeout expiry).
    async fn mint(
        &self,
        recipient: &WalletAddress,
        metadata_uri: &str,
    ) -> Result<ChainReceipt, ChainError>;

    /// Point a token at new (post-event) metadata.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotFound`] for unknown tokens, otherwise as [`Self::mint`].
    async fn update_metadata(
        &self,
        token_id: &TokenId,
        new_uri: &str,
    ) -> Result<ChainReceipt, ChainError>;

    /// Permanently destroy a token.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotFound`] for unknown tokens, otherwise as [`Self::mint`].
    async fn burn(&self, token_id: &TokenId) -> Result<ChainReceipt, ChainError>;

    /// Read a token's URI, used-flag and owner.
    ///
    /// Callers must tolerate failure here without aborting the whole request:
    /// chain info degrades to `None` while the local data still serves.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotFound`] / [`ChainError::Unavailable`].
    async fn token_info(&self, token_id: &TokenId) -> Result<TokenInfo, ChainError>;

    /// Total number of tokens the contract has minted.
    ///
    /// # Errors
    ///
    /// [`ChainError::Unavailable`] when the network cannot be reached.
    async fn total_supply(&self) -> Result<u64, ChainError>;

    /// Native-currency balance of an address, as a decimal ETH string.
    ///
    /// # Errors
    ///
    /// [`ChainError::Unavailable`] when the network cannot be reached.
    async fn balance(&self, address: &WalletAddress) -> Result<String, ChainError>;
}
