//! Ledger store trait: the system's own database of tickets and events.
//!
//! # Design
//!
//! The store is a durable keyed mapping (`token_id -> Ticket`,
//! `event_id -> Event`, `wallet -> AttendeeRecord`) and deliberately does
//! **not** enforce state-machine rules; transition legality is the lifecycle
//! manager's job. The one exception is [`LedgerStore::reserve_seat`], which
//! must combine the duplicate-purchase check and the seat increment in a
//! single atomic step so that concurrent purchases can neither oversell an
//! event nor double-book a wallet.
//!
//! # Implementations
//!
//! - `MemoryLedgerStore` (in `ticketchain-store`): demo variant, seeded with
//!   sample events
//! - `PostgresLedgerStore` (in `ticketchain-store`): persistent variant

use crate::error::StoreError;
use crate::types::{
    AttendeeRecord, Event, PurchaseRecord, PurchaseStatus, Ticket, TicketCounts, TicketStatus,
    TokenId, WalletAddress,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Fields stamped onto a ticket row alongside a status change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckInFields {
    /// Post-event metadata pointer (set on check-in).
    pub post_metadata_uri: Option<String>,
    /// Check-in timestamp (set once).
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Who performed the check-in.
    pub checked_in_by: Option<String>,
}

/// Durable mapping of tickets, events and attendee records.
///
/// All methods take `&self`; implementations handle their own interior
/// mutability and locking.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ------------------------------------------------------------------
    // Tickets (organizer flow)
    // ------------------------------------------------------------------

    /// Insert a freshly minted ticket.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the token id is already present.
    async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StoreError>;

    /// Look up a ticket by token id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn find_ticket(&self, token_id: &TokenId) -> Result<Option<Ticket>, StoreError>;

    /// Change a ticket's status, stamping the given fields.
    ///
    /// The caller guarantees the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the ticket is absent.
    async fn update_ticket_status(
        &self,
        token_id: &TokenId,
        status: TicketStatus,
        fields: CheckInFields,
    ) -> Result<Ticket, StoreError>;

    /// Permanently invalidate a ticket.
    ///
    /// The demo variant removes the row; the persistent variant marks it
    /// `burned` and keeps it (tickets are never deleted there).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the ticket is absent.
    async fn burn_ticket(&self, token_id: &TokenId) -> Result<(), StoreError>;

    /// All tickets owned by a wallet, in insertion order. Possibly empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn find_tickets_by_owner(
        &self,
        owner: &WalletAddress,
    ) -> Result<Vec<Ticket>, StoreError>;

    /// Aggregate per-status counts for statistics reporting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn count_tickets_by_status(&self) -> Result<TicketCounts, StoreError>;

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Look up an event by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError>;

    /// All events known to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Atomically claim a seat on an event for a wallet.
    ///
    /// In one critical section (or transaction): verify the event exists,
    /// verify the wallet holds no purchase entry for it, verify
    /// `booked_seats < max_seats`, then increment `booked_seats` and mark the
    /// `(wallet, event)` pair as taken. Returns the event as of after the
    /// increment.
    ///
    /// The claim stands even if the subsequent chain mint fails; the
    /// purchase flow always records the ticket locally.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the event does not exist
    /// - [`StoreError::SeatsExhausted`] if the event is sold out
    /// - [`StoreError::DuplicatePurchase`] if the wallet already claimed or
    ///   purchased this event
    async fn reserve_seat(
        &self,
        event_id: &str,
        wallet: &WalletAddress,
    ) -> Result<Event, StoreError>;

    // ------------------------------------------------------------------
    // Attendee records (wallet flow)
    // ------------------------------------------------------------------

    /// Record a completed purchase against a previously claimed seat,
    /// creating the attendee record on a wallet's first purchase.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn record_purchase(
        &self,
        wallet: &WalletAddress,
        record: PurchaseRecord,
    ) -> Result<AttendeeRecord, StoreError>;

    /// The attendee record for a wallet, if it purchased anything.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn find_attendee(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Option<AttendeeRecord>, StoreError>;

    /// Change the status of a wallet's purchase entry for an event.
    ///
    /// The caller guarantees the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the wallet has no entry for the
    /// event.
    async fn update_purchase_status(
        &self,
        wallet: &WalletAddress,
        event_id: &str,
        status: PurchaseStatus,
    ) -> Result<PurchaseRecord, StoreError>;
}
