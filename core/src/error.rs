//! Error taxonomy for the ticketing domain.
//!
//! Three layers, matching the component boundaries:
//!
//! - [`StoreError`]: failures inside the ledger store
//! - [`ChainError`]: failures talking to the external ledger
//! - [`TicketError`]: what the lifecycle manager surfaces to callers
//!
//! Propagation policy: validation errors are raised before any side effect;
//! chain errors abort organizer-driven requests but are caught, logged and
//! converted into a degraded success for the wallet purchase/check-in flows.

use crate::types::{InvalidAddress, TokenId};
use thiserror::Error;

/// Errors raised by a [`crate::ledger::LedgerStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same key already exists.
    #[error("record for token {0} already exists")]
    Conflict(TokenId),

    /// The requested record does not exist. Carries the full user-facing
    /// message.
    #[error("{0}")]
    NotFound(String),

    /// `booked_seats == max_seats` at increment time; the purchase loses.
    #[error("All seats for this event have been booked.")]
    SeatsExhausted,

    /// The wallet already holds a purchase entry for this event.
    #[error("You have already purchased a ticket for this event.")]
    DuplicatePurchase,

    /// The storage backend itself failed (connection, query, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Errors raised by a [`crate::chain::ChainGateway`] implementation.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The supplied wallet address failed validation before any network call.
    #[error("Invalid Ethereum address format")]
    InvalidAddress,

    /// The token does not exist on chain.
    #[error("token {0} does not exist on chain")]
    NotFound(TokenId),

    /// The network was reachable but rejected the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The remote network could not be reached (includes timeouts).
    #[error("chain endpoint unreachable: {0}")]
    Unavailable(String),

    /// The gateway is not configured or the contract is not deployed;
    /// mutating operations fail fast without attempting a network call.
    #[error("chain gateway is not ready")]
    NotReady,
}

impl From<InvalidAddress> for ChainError {
    fn from(_: InvalidAddress) -> Self {
        Self::InvalidAddress
    }
}

/// Errors surfaced by the lifecycle manager.
///
/// The HTTP layer maps these onto status codes: validation and lifecycle
/// conflicts to 400, missing records to 404, gateway readiness and chain
/// failures to 500.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Malformed or missing input. Carries the full user-facing message.
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist. Carries the full user-facing
    /// message.
    #[error("{0}")]
    NotFound(String),

    /// The event has no seats left.
    #[error("All seats for this event have been booked.")]
    SoldOut,

    /// The wallet already purchased a ticket for this event.
    #[error("You have already purchased a ticket for this event.")]
    DuplicatePurchase,

    /// The ticket was already checked in.
    #[error("Ticket has already been checked in")]
    AlreadyUsed,

    /// The ticket was burned and can never be checked in.
    #[error("Ticket has been burned and cannot be checked in")]
    Burned,

    /// The chain gateway is not ready for mutating operations.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// A chain call failed on a path with no local fallback.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The ledger store failed in a way the caller cannot recover from.
    #[error("ledger store failure: {0}")]
    Store(String),
}

impl TicketError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Convenience constructor for missing records.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<StoreError> for TicketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::SeatsExhausted => Self::SoldOut,
            StoreError::DuplicatePurchase => Self::DuplicatePurchase,
            // A duplicate token id on insert means the chain handed out a
            // token we already recorded; fatal for the request.
            StoreError::Conflict(token) => {
                Self::Store(format!("duplicate ledger record for token {token}"))
            }
            StoreError::Backend(message) => Self::Store(message),
        }
    }
}

impl From<InvalidAddress> for TicketError {
    fn from(err: InvalidAddress) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_onto_lifecycle_errors() {
        assert!(matches!(
            TicketError::from(StoreError::SeatsExhausted),
            TicketError::SoldOut
        ));
        assert!(matches!(
            TicketError::from(StoreError::DuplicatePurchase),
            TicketError::DuplicatePurchase
        ));
        assert!(matches!(
            TicketError::from(StoreError::Conflict(TokenId::OnChain(7))),
            TicketError::Store(_)
        ));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            TicketError::SoldOut.to_string(),
            "All seats for this event have been booked."
        );
        assert_eq!(
            TicketError::DuplicatePurchase.to_string(),
            "You have already purchased a ticket for this event."
        );
    }
}
