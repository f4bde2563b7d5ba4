//! Shared application state for HTTP handlers.

use crate::wallet::WalletSession;
use std::sync::Arc;
use ticketchain_core::LifecycleManager;

/// State shared across all handlers.
///
/// Cheap to clone; everything behind it is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Ticket lifecycle orchestrator.
    pub manager: Arc<LifecycleManager>,
    /// Wallet connection session.
    pub wallet: Arc<WalletSession>,
}

impl AppState {
    /// Assemble the state from its components.
    #[must_use]
    pub fn new(manager: Arc<LifecycleManager>, wallet: Arc<WalletSession>) -> Self {
        Self { manager, wallet }
    }
}
