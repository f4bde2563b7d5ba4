//! In-memory ledger store for the demo variant and tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use ticketchain_core::error::StoreError;
use ticketchain_core::ledger::{CheckInFields, LedgerStore};
use ticketchain_core::types::{
    AttendeeRecord, Event, PurchaseRecord, PurchaseStatus, Ticket, TicketCounts, TicketStatus,
    TokenId, WalletAddress,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    /// Tickets in insertion order.
    tickets: Vec<Ticket>,
    /// Events keyed by id.
    events: BTreeMap<String, Event>,
    /// Per-wallet purchase history.
    attendees: HashMap<WalletAddress, AttendeeRecord>,
    /// `(wallet, event)` pairs with a seat claimed but the purchase record
    /// not yet written. Consulted by the duplicate check.
    claims: HashSet<(WalletAddress, String)>,
}

/// Demo-variant ledger store: a map-of-maps behind one async mutex.
///
/// Holding the mutex for the whole of [`LedgerStore::reserve_seat`] is what
/// makes the duplicate check and the seat increment atomic; no chain call
/// ever happens under it.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Inner>,
}

impl MemoryLedgerStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the five sample events.
    #[must_use]
    pub fn with_sample_events() -> Self {
        Self::with_events(crate::seed::sample_events())
    }

    /// A store pre-loaded with the given events.
    #[must_use]
    pub fn with_events(events: Vec<Event>) -> Self {
        let mut inner = Inner::default();
        for event in events {
            inner.events.insert(event.id.clone(), event);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.tickets.iter().any(|t| t.token_id == ticket.token_id) {
            return Err(StoreError::Conflict(ticket.token_id));
        }
        inner.tickets.push(ticket);
        Ok(())
    }

    async fn find_ticket(&self, token_id: &TokenId) -> Result<Option<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets.iter().find(|t| &t.token_id == token_id).cloned())
    }

    async fn update_ticket_status(
        &self,
        token_id: &TokenId,
        status: TicketStatus,
        fields: CheckInFields,
    ) -> Result<Ticket, StoreError> {
        let mut inner = self.inner.lock().await;
        let ticket = inner
            .tickets
            .iter_mut()
            .find(|t| &t.token_id == token_id)
            .ok_or_else(|| StoreError::NotFound("Ticket not found".to_string()))?;
        ticket.status = status;
        if let Some(uri) = fields.post_metadata_uri {
            ticket.post_metadata_uri = Some(uri);
        }
        if let Some(at) = fields.checked_in_at {
            ticket.checked_in_at = Some(at);
        }
        if let Some(by) = fields.checked_in_by {
            ticket.checked_in_by = Some(by);
        }
        Ok(ticket.clone())
    }

    async fn burn_ticket(&self, token_id: &TokenId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.tickets.len();
        inner.tickets.retain(|t| &t.token_id != token_id);
        if inner.tickets.len() == before {
            return Err(StoreError::NotFound("Ticket not found".to_string()));
        }
        Ok(())
    }

    async fn find_tickets_by_owner(
        &self,
        owner: &WalletAddress,
    ) -> Result<Vec<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .iter()
            .filter(|t| &t.owner_address == owner)
            .cloned()
            .collect())
    }

    async fn count_tickets_by_status(&self) -> Result<TicketCounts, StoreError> {
        let inner = self.inner.lock().await;
        let mut counts = TicketCounts::default();
        for ticket in &inner.tickets {
            counts.total += 1;
            match ticket.status {
                TicketStatus::Minted => counts.minted += 1,
                TicketStatus::CheckedIn => counts.checked_in += 1,
                TicketStatus::Burned => counts.burned += 1,
            }
        }
        Ok(counts)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.events.get(event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.events.values().cloned().collect())
    }

    async fn reserve_seat(
        &self,
        event_id: &str,
        wallet: &WalletAddress,
    ) -> Result<Event, StoreError> {
        let mut inner = self.inner.lock().await;

        let already_purchased = inner
            .attendees
            .get(wallet)
            .is_some_and(|a| a.purchase(event_id).is_some());
        if already_purchased
            || inner
                .claims
                .contains(&(wallet.clone(), event_id.to_string()))
        {
            return Err(StoreError::DuplicatePurchase);
        }

        let event = inner
            .events
            .get_mut(event_id)
            .ok_or_else(|| StoreError::NotFound("Event not found.".to_string()))?;
        if !event.has_capacity() {
            return Err(StoreError::SeatsExhausted);
        }
        event.booked_seats += 1;
        let snapshot = event.clone();

        inner.claims.insert((wallet.clone(), event_id.to_string()));
        Ok(snapshot)
    }

    async fn record_purchase(
        &self,
        wallet: &WalletAddress,
        record: PurchaseRecord,
    ) -> Result<AttendeeRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.claims.remove(&(wallet.clone(), record.event_id.clone()));
        let attendee = inner
            .attendees
            .entry(wallet.clone())
            .or_insert_with(|| AttendeeRecord::new(wallet.clone()));
        attendee.push(record);
        Ok(attendee.clone())
    }

    async fn find_attendee(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Option<AttendeeRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.attendees.get(wallet).cloned())
    }

    async fn update_purchase_status(
        &self,
        wallet: &WalletAddress,
        event_id: &str,
        status: PurchaseStatus,
    ) -> Result<PurchaseRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .attendees
            .get_mut(wallet)
            .and_then(|a| a.purchases.iter_mut().find(|p| p.event_id == event_id))
            .ok_or_else(|| {
                StoreError::NotFound("User has not registered for this event.".to_string())
            })?;
        entry.status = status;
        Ok(entry.clone())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn wallet(n: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{:040x}", u64::from(n))).expect("valid address")
    }

    fn purchase_record(event_id: &str) -> PurchaseRecord {
        PurchaseRecord {
            event_id: event_id.to_string(),
            event_name: "Sample".to_string(),
            event_type: ticketchain_core::EventType::Tech,
            status: PurchaseStatus::ToBeAttended,
            purchased_at: Utc::now(),
            event_date: Utc::now(),
            event_location: "NYC".to_string(),
            token_id: TokenId::synthetic(),
            tx_hash: "local_0".to_string(),
            metadata_uri: "{}".to_string(),
            mint_success: false,
            block_number: None,
        }
    }

    #[tokio::test]
    async fn reserve_seat_increments_and_blocks_duplicates() {
        let store = MemoryLedgerStore::with_sample_events();
        let buyer = wallet(1);

        let event = store.reserve_seat("1", &buyer).await.expect("first reservation");
        assert_eq!(event.booked_seats, 128);

        // Duplicate before the purchase record lands (claim in force).
        let err = store.reserve_seat("1", &buyer).await.expect_err("claimed");
        assert!(matches!(err, StoreError::DuplicatePurchase));

        store
            .record_purchase(&buyer, purchase_record("1"))
            .await
            .expect("record purchase");

        // Duplicate after the record lands.
        let err = store.reserve_seat("1", &buyer).await.expect_err("recorded");
        assert!(matches!(err, StoreError::DuplicatePurchase));

        // Another wallet still gets a seat.
        let event = store.reserve_seat("1", &wallet(2)).await.expect("other wallet");
        assert_eq!(event.booked_seats, 129);
    }

    #[tokio::test]
    async fn reserve_seat_rejects_unknown_event_and_sold_out() {
        let store = MemoryLedgerStore::with_events(vec![Event {
            id: "tiny".to_string(),
            name: "Tiny".to_string(),
            event_type: ticketchain_core::EventType::Other,
            location: "here".to_string(),
            date: Utc::now(),
            price: 1.0,
            max_seats: 1,
            booked_seats: 0,
        }]);

        assert!(matches!(
            store.reserve_seat("nope", &wallet(1)).await,
            Err(StoreError::NotFound(_))
        ));

        store.reserve_seat("tiny", &wallet(1)).await.expect("last seat");
        assert!(matches!(
            store.reserve_seat("tiny", &wallet(2)).await,
            Err(StoreError::SeatsExhausted)
        ));
    }

    #[tokio::test]
    async fn concurrent_purchases_of_last_seat_yield_one_winner() {
        let store = Arc::new(MemoryLedgerStore::with_events(vec![Event {
            id: "last".to_string(),
            name: "Last Seat".to_string(),
            event_type: ticketchain_core::EventType::Music,
            location: "Miami, FL".to_string(),
            date: Utc::now(),
            price: 10.0,
            max_seats: 10,
            booked_seats: 9,
        }]));

        let mut handles = Vec::new();
        for n in 1..=8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.reserve_seat("last", &wallet(n)).await
            }));
        }

        let mut wins = 0;
        let mut sold_out = 0;
        for handle in handles {
            match handle.await.expect("task completes") {
                Ok(_) => wins += 1,
                Err(StoreError::SeatsExhausted) => sold_out += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(sold_out, 7);

        let event = store.get_event("last").await.expect("query").expect("exists");
        assert_eq!(event.booked_seats, event.max_seats);
    }

    #[tokio::test]
    async fn burn_removes_the_row_in_the_demo_variant() {
        let store = MemoryLedgerStore::new();
        let owner = wallet(3);
        let ticket = Ticket {
            token_id: TokenId::OnChain(1),
            contract_address: "0xc0ffee".to_string(),
            owner_address: owner.clone(),
            event_name: "Sample".to_string(),
            event_date: Utc::now(),
            event_location: "NYC".to_string(),
            pre_metadata_uri: "ipfs://pre".to_string(),
            post_metadata_uri: None,
            status: TicketStatus::Minted,
            original_price: 10.0,
            minted_at: Utc::now(),
            checked_in_at: None,
            checked_in_by: None,
        };
        store.insert_ticket(ticket.clone()).await.expect("insert");

        // Duplicate token ids conflict.
        assert!(matches!(
            store.insert_ticket(ticket).await,
            Err(StoreError::Conflict(_))
        ));

        store.burn_ticket(&TokenId::OnChain(1)).await.expect("burn");
        assert!(
            store
                .find_ticket(&TokenId::OnChain(1))
                .await
                .expect("query")
                .is_none()
        );
        assert!(store.find_tickets_by_owner(&owner).await.expect("query").is_empty());
    }

    #[tokio::test]
    async fn counts_group_by_status() {
        let store = MemoryLedgerStore::new();
        for (n, status) in [
            (1, TicketStatus::Minted),
            (2, TicketStatus::Minted),
            (3, TicketStatus::CheckedIn),
        ] {
            store
                .insert_ticket(Ticket {
                    token_id: TokenId::OnChain(n),
                    contract_address: "0xc0ffee".to_string(),
                    owner_address: wallet(9),
                    event_name: "Sample".to_string(),
                    event_date: Utc::now(),
                    event_location: "NYC".to_string(),
                    pre_metadata_uri: "ipfs://pre".to_string(),
                    post_metadata_uri: None,
                    status,
                    original_price: 10.0,
                    minted_at: Utc::now(),
                    checked_in_at: None,
                    checked_in_by: None,
                })
                .await
                .expect("insert");
        }

        let counts = store.count_tickets_by_status().await.expect("counts");
        assert_eq!(counts.total, 3);
        assert_eq!(counts.minted, 2);
        assert_eq!(counts.checked_in, 1);
        assert_eq!(counts.burned, 0);
    }
}
