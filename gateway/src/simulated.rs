//! Deterministic in-process chain for the demo variant and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use ticketchain_core::chain::{ChainGateway, ChainReceipt, TokenInfo};
use ticketchain_core::error::ChainError;
use ticketchain_core::types::{TokenId, WalletAddress};

#[derive(Debug)]
struct SimToken {
    uri: String,
    is_used: bool,
    owner: WalletAddress,
}

#[derive(Debug, Default)]
struct SimState {
    last_token_id: u64,
    tokens: HashMap<u64, SimToken>,
}

/// In-process chain gateway.
///
/// Token ids count up from 1 and are never reused, even after a burn.
/// `total_supply` reports tokens ever minted, mirroring a contract with a
/// monotonic counter. The failure toggles exist so callers' degraded-mode
/// policies can be exercised without a network.
pub struct SimulatedChain {
    state: Mutex<SimState>,
    ready: bool,
    contract_ready: bool,
    fail_mints: bool,
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChain {
    /// Fully operational simulated chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
            ready: true,
            contract_ready: true,
            fail_mints: false,
        }
    }

    /// A gateway with no provider configured. Every probe reports false.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            ready: false,
            contract_ready: false,
            ..Self::new()
        }
    }

    /// A configured gateway whose contract is not deployed.
    #[must_use]
    pub fn without_contract() -> Self {
        Self {
            contract_ready: false,
            ..Self::new()
        }
    }

    /// A gateway that rejects every mint, for fallback-path tests.
    #[must_use]
    pub fn failing_mints() -> Self {
        Self {
            fail_mints: true,
            ..Self::new()
        }
    }

    fn tx_hash(kind: &str, token_id: u64) -> String {
        format!("0xsim_{kind}_{}_{token_id}", Utc::now().timestamp_millis())
    }

    fn on_chain_id(token_id: &TokenId) -> Result<u64, ChainError> {
        token_id
            .as_u64()
            .ok_or_else(|| ChainError::NotFound(token_id.clone()))
    }
}

#[async_trait]
impl ChainGateway for SimulatedChain {
    async fn is_ready(&self) -> bool {
        self.ready
    }

    async fn is_contract_ready(&self) -> bool {
        self.contract_ready
    }

    async fn mint(
        &self,
        recipient: &WalletAddress,
        metadata_uri: &str,
    ) -> Result<ChainReceipt, ChainError> {
        if !self.ready {
            return Err(ChainError::NotReady);
        }
        if self.fail_mints {
            return Err(ChainError::Rejected("simulated mint failure".to_string()));
        }

        let mut state = self.state.lock().await;
        state.last_token_id += 1;
        let token_id = state.last_token_id;
        state.tokens.insert(
            token_id,
            SimToken {
                uri: metadata_uri.to_string(),
                is_used: false,
                owner: recipient.clone(),
            },
        );
        tracing::debug!(token_id, recipient = %recipient, "simulated mint");

        Ok(ChainReceipt {
            token_id: TokenId::OnChain(token_id),
            tx_hash: Self::tx_hash("mint", token_id),
            block_number: 12_345_678,
            gas_used: 50_000,
        })
    }

    async fn update_metadata(
        &self,
        token_id: &TokenId,
        new_uri: &str,
    ) -> Result<ChainReceipt, ChainError> {
        if !self.ready {
            return Err(ChainError::NotReady);
        }
        let id = Self::on_chain_id(token_id)?;

        let mut state = self.state.lock().await;
        let token = state
            .tokens
            .get_mut(&id)
            .ok_or_else(|| ChainError::NotFound(token_id.clone()))?;
        token.uri = new_uri.to_string();
        token.is_used = true;

        Ok(ChainReceipt {
            token_id: token_id.clone(),
            tx_hash: Self::tx_hash("update", id),
            block_number: 12_345_679,
            gas_used: 30_000,
        })
    }

    async fn burn(&self, token_id: &TokenId) -> Result<ChainReceipt, ChainError> {
        if !self.ready {
            return Err(ChainError::NotReady);
        }
        let id = Self::on_chain_id(token_id)?;

        let mut state = self.state.lock().await;
        if state.tokens.remove(&id).is_none() {
            return Err(ChainError::NotFound(token_id.clone()));
        }

        Ok(ChainReceipt {
            token_id: token_id.clone(),
            tx_hash: Self::tx_hash("burn", id),
            block_number: 12_345_680,
            gas_used: 25_000,
        })
    }

    async fn token_info(&self, token_id: &TokenId) -> Result<TokenInfo, ChainError> {
        let id = Self::on_chain_id(token_id)?;
        let state = self.state.lock().await;
        let token = state
            .tokens
            .get(&id)
            .ok_or_else(|| ChainError::NotFound(token_id.clone()))?;
        Ok(TokenInfo {
            token_id: token_id.clone(),
            uri: token.uri.clone(),
            is_used: token.is_used,
            owner: token.owner.clone(),
        })
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().await.last_token_id)
    }

    async fn balance(&self, _address: &WalletAddress) -> Result<String, ChainError> {
        if !self.ready {
            return Err(ChainError::NotReady);
        }
        Ok("10.0".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn wallet(n: u64) -> WalletAddress {
        WalletAddress::parse(&format!("0x{n:040x}")).expect("valid address")
    }

    #[tokio::test]
    async fn mints_assign_sequential_token_ids() {
        let chain = SimulatedChain::new();
        let first = chain.mint(&wallet(1), "{}").await.expect("mint");
        let second = chain.mint(&wallet(2), "{}").await.expect("mint");
        assert_eq!(first.token_id, TokenId::OnChain(1));
        assert_eq!(second.token_id, TokenId::OnChain(2));
        assert_eq!(chain.total_supply().await.expect("supply"), 2);
    }

    #[tokio::test]
    async fn update_marks_token_used() {
        let chain = SimulatedChain::new();
        let receipt = chain.mint(&wallet(1), "pre").await.expect("mint");
        chain
            .update_metadata(&receipt.token_id, "post")
            .await
            .expect("update");

        let info = chain.token_info(&receipt.token_id).await.expect("info");
        assert!(info.is_used);
        assert_eq!(info.uri, "post");
    }

    #[tokio::test]
    async fn burn_removes_token_but_supply_counter_stays() {
        let chain = SimulatedChain::new();
        let receipt = chain.mint(&wallet(1), "{}").await.expect("mint");
        chain.burn(&receipt.token_id).await.expect("burn");

        let err = chain
            .token_info(&receipt.token_id)
            .await
            .expect_err("burned token is gone");
        assert!(matches!(err, ChainError::NotFound(_)));
        assert_eq!(chain.total_supply().await.expect("supply"), 1);
    }

    #[tokio::test]
    async fn offline_gateway_refuses_mutations() {
        let chain = SimulatedChain::offline();
        assert!(!chain.is_ready().await);
        let err = chain.mint(&wallet(1), "{}").await.expect_err("not ready");
        assert!(matches!(err, ChainError::NotReady));
    }

    #[tokio::test]
    async fn failing_mints_reject_without_touching_state() {
        let chain = SimulatedChain::failing_mints();
        let err = chain.mint(&wallet(1), "{}").await.expect_err("rejected");
        assert!(matches!(err, ChainError::Rejected(_)));
        assert_eq!(chain.total_supply().await.expect("supply"), 0);
    }

    #[tokio::test]
    async fn synthetic_token_ids_are_unknown_to_the_chain() {
        let chain = SimulatedChain::new();
        let local = TokenId::synthetic();
        let err = chain
            .update_metadata(&local, "post")
            .await
            .expect_err("local ids never exist on chain");
        assert!(matches!(err, ChainError::NotFound(_)));
    }
}
