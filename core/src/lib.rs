//! # Ticketchain Core
//!
//! Domain model and lifecycle logic for the Ticketchain NFT event ticketing
//! service.
//!
//! This crate holds everything that is independent of a concrete storage
//! backend or blockchain endpoint:
//!
//! - **Types**: tickets, events, attendee records, wallet addresses and
//!   token identifiers, with their validation rules
//! - **Trait seams**: [`ledger::LedgerStore`] (the system's own database of
//!   tickets and events) and [`chain::ChainGateway`] (the wrapper around the
//!   deployed smart contract)
//! - **Lifecycle Manager**: [`lifecycle::LifecycleManager`], the state
//!   machine that orchestrates purchase, check-in and burn while enforcing
//!   the ticket invariants
//!
//! ## Architecture Principles
//!
//! - Dependency Injection via trait objects (no process-wide singletons)
//! - Explicit `Result` propagation; best-effort chain calls return results
//!   that the caller is allowed to discard after logging
//! - The Ledger Store is authoritative for ticket ownership even when the
//!   chain write fails (local-fallback policy)

pub mod chain;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod metadata;
pub mod types;

pub use chain::{ChainGateway, ChainReceipt, TokenInfo};
pub use error::{ChainError, StoreError, TicketError};
pub use ledger::{CheckInFields, LedgerStore};
pub use lifecycle::{
    CheckInOutcome, CheckedInTicket, LifecycleManager, MintTicketRequest, MintedTicket,
    PurchaseOutcome, Stats, TicketDetails,
};
pub use types::{
    AttendeeRecord, Event, EventType, PurchaseRecord, PurchaseStatus, Ticket, TicketCounts,
    TicketStatus, TokenId, WalletAddress,
};
