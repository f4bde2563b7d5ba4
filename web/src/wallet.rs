//! Wallet connection session.
//!
//! The frontend drives one wallet connection at a time through the backend;
//! this keeps that connection state in-process. Balance lookups go through
//! the chain gateway, everything else is pure session bookkeeping.

use serde::Serialize;
use std::sync::Arc;
use ticketchain_core::{ChainGateway, WalletAddress};
use tokio::sync::Mutex;

/// Connection status snapshot, as reported by `/api/wallet/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    /// Whether the session service has been set up.
    pub initialized: bool,
    /// Whether a wallet is currently connected.
    pub connected: bool,
    /// Provider availability (mirrors `connected` here).
    pub provider: bool,
    /// Signer availability (mirrors `connected` here).
    pub signer: bool,
}

/// One in-process wallet connection.
pub struct WalletSession {
    connected: Mutex<Option<WalletAddress>>,
    chain: Arc<dyn ChainGateway>,
}

impl WalletSession {
    /// New disconnected session over a chain gateway for balance reads.
    #[must_use]
    pub fn new(chain: Arc<dyn ChainGateway>) -> Self {
        Self {
            connected: Mutex::new(None),
            chain,
        }
    }

    /// Connect a wallet, replacing any previous connection.
    pub async fn connect(&self, address: WalletAddress) {
        tracing::info!(address = %address, "wallet connected");
        *self.connected.lock().await = Some(address);
    }

    /// Drop the current connection, if any.
    pub async fn disconnect(&self) {
        if self.connected.lock().await.take().is_some() {
            tracing::info!("wallet disconnected");
        }
    }

    /// The connected address, if any.
    pub async fn address(&self) -> Option<WalletAddress> {
        self.connected.lock().await.clone()
    }

    /// Current connection status.
    pub async fn status(&self) -> ConnectionStatus {
        let connected = self.connected.lock().await.is_some();
        ConnectionStatus {
            initialized: true,
            connected,
            provider: connected,
            signer: connected,
        }
    }

    /// Native balance of the connected wallet, as a decimal ETH string.
    ///
    /// Returns `None` when no wallet is connected or the chain is
    /// unreachable; the caller turns that into a 404.
    pub async fn balance(&self) -> Option<String> {
        let address = self.address().await?;
        match self.chain.balance(&address).await {
            Ok(balance) => Some(balance),
            Err(err) => {
                tracing::warn!(address = %address, error = %err, "balance lookup failed");
                None
            }
        }
    }

    /// Whether a network switch can be performed (requires a connection).
    pub async fn can_switch_network(&self) -> bool {
        self.connected.lock().await.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use ticketchain_gateway::SimulatedChain;

    fn wallet(n: u64) -> WalletAddress {
        WalletAddress::parse(&format!("0x{n:040x}")).expect("valid address")
    }

    #[tokio::test]
    async fn connect_disconnect_cycle() {
        let session = WalletSession::new(Arc::new(SimulatedChain::new()));
        assert!(!session.status().await.connected);

        session.connect(wallet(1)).await;
        assert!(session.status().await.connected);
        assert_eq!(session.address().await, Some(wallet(1)));
        assert!(session.balance().await.is_some());

        session.disconnect().await;
        assert!(session.address().await.is_none());
        assert!(session.balance().await.is_none());
    }
}
