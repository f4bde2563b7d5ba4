//! Ticket Lifecycle Manager.
//!
//! Orchestrates purchase, check-in and burn over the [`LedgerStore`] and
//! [`ChainGateway`] seams, enforcing the state machine
//! `minted -> checked_in` (terminal) with `burned` reachable from either as
//! an administrative action.
//!
//! Two policies distinguish the wallet flow from the organizer flow:
//!
//! - **Local fallback on mint failure** (wallet purchase): ticket ownership
//!   is authoritative in the ledger store, so a failed chain mint records the
//!   purchase under a synthetic token id instead of rolling back. The caller
//!   sees success with `mint_success == false`.
//! - **Best-effort metadata update** (wallet check-in): the local status
//!   change is authoritative; a failed chain update is logged and swallowed.
//!   The organizer flows have no such fallback and abort on chain failure.
//!
//! The seat-reservation critical section lives inside
//! [`LedgerStore::reserve_seat`]; the manager never holds it across a
//! network call.

use crate::chain::{ChainGateway, ChainReceipt, TokenInfo};
use crate::error::TicketError;
use crate::ledger::{CheckInFields, LedgerStore};
use crate::metadata::TicketMetadata;
use crate::types::{
    AttendeeRecord, Event, PurchaseRecord, PurchaseStatus, Ticket, TicketCounts, TicketStatus,
    TokenId, WalletAddress,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Organizer mint request, after the HTTP layer has checked field presence.
#[derive(Debug, Clone, Deserialize)]
pub struct MintTicketRequest {
    /// Recipient wallet, unvalidated input.
    pub recipient_address: String,
    /// Event name.
    pub event_name: String,
    /// Event date, RFC 3339 or `YYYY-MM-DD`.
    pub event_date: String,
    /// Event location.
    pub event_location: String,
    /// Pre-event metadata pointer.
    pub pre_metadata_uri: String,
    /// Sale price; must be strictly positive.
    pub original_price: f64,
}

/// Result of an organizer-driven mint.
#[derive(Debug, Clone, Serialize)]
pub struct MintedTicket {
    /// The ticket row as inserted.
    pub ticket: Ticket,
    /// Chain confirmation.
    pub receipt: ChainReceipt,
}

/// Result of a wallet-flow purchase.
///
/// Always a success from the caller's point of view; `mint_success`
/// distinguishes a real chain mint from the local fallback.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    /// Token backing the purchase (synthetic when the mint failed).
    #[serde(rename = "tokenId")]
    pub token_id: TokenId,
    /// Mint transaction hash (synthetic when the mint failed).
    #[serde(rename = "transactionHash")]
    pub tx_hash: String,
    /// Whether the chain mint actually went through.
    #[serde(rename = "nftMintSuccess")]
    pub mint_success: bool,
    /// The event after the seat increment.
    pub event: Event,
    /// The wallet's updated attendee record.
    #[serde(rename = "updatedNft")]
    pub attendee: AttendeeRecord,
}

/// Result of a wallet-flow check-in.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    /// New status of the purchase entry (always `Attended`).
    #[serde(rename = "eventStatus")]
    pub status: PurchaseStatus,
    /// Token backing the purchase.
    #[serde(rename = "tokenId")]
    pub token_id: TokenId,
    /// Name of the attended event.
    #[serde(rename = "eventName")]
    pub event_name: String,
}

/// Result of an organizer-driven check-in.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedInTicket {
    /// The ticket row after the transition.
    pub ticket: Ticket,
    /// Chain confirmation of the metadata update.
    pub receipt: ChainReceipt,
}

/// A ticket together with its (optional) on-chain view.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetails {
    /// The ledger store row.
    pub token: Ticket,
    /// On-chain info; `None` when the network was unreachable.
    pub blockchain: Option<TokenInfo>,
}

/// Statistics snapshot for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    /// Per-status counts from the ledger store.
    pub database: TicketCounts,
    /// Contract total supply; `None` when the network was unreachable.
    #[serde(rename = "totalSupply")]
    pub total_supply: Option<u64>,
}

/// Orchestrates the ticket lifecycle over injected store and gateway handles.
///
/// Constructed once at process start and shared by reference; holds no
/// entity copies beyond the scope of a single request.
pub struct LifecycleManager {
    store: Arc<dyn LedgerStore>,
    chain: Arc<dyn ChainGateway>,
    contract_address: String,
}

impl LifecycleManager {
    /// Wire a manager to its store and gateway.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        chain: Arc<dyn ChainGateway>,
        contract_address: impl Into<String>,
    ) -> Self {
        Self {
            store,
            chain,
            contract_address: contract_address.into(),
        }
    }

    /// The ledger store handle (read paths the HTTP layer serves directly).
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// The chain gateway handle.
    #[must_use]
    pub fn chain(&self) -> &Arc<dyn ChainGateway> {
        &self.chain
    }

    // ------------------------------------------------------------------
    // Wallet flow
    // ------------------------------------------------------------------

    /// Purchase a ticket for `event_id` with the given wallet.
    ///
    /// Reserves a seat atomically, then mints outside the critical section.
    /// A chain failure does not fail the purchase: the ticket is recorded
    /// locally under a synthetic token id (`mint_success == false`).
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] for a malformed wallet address
    /// - [`TicketError::NotFound`] if the event does not exist
    /// - [`TicketError::SoldOut`] / [`TicketError::DuplicatePurchase`] per
    ///   the seat-reservation contract
    pub async fn purchase(
        &self,
        event_id: &str,
        wallet_input: &str,
    ) -> Result<PurchaseOutcome, TicketError> {
        let wallet = WalletAddress::parse(wallet_input)?;

        // Atomic: duplicate check + compare-and-increment. The claim is not
        // rolled back on mint failure; the fallback below always records.
        let event = self.store.reserve_seat(event_id, &wallet).await?;

        let metadata_uri = TicketMetadata::pre_event(&event).into_uri();
        let mint = self.mint_or_fallback(&wallet, &metadata_uri).await;

        let record = PurchaseRecord {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_type: event.event_type,
            status: PurchaseStatus::ToBeAttended,
            purchased_at: Utc::now(),
            event_date: event.date,
            event_location: event.location.clone(),
            token_id: mint.token_id.clone(),
            tx_hash: mint.tx_hash.clone(),
            metadata_uri,
            mint_success: mint.success,
            block_number: mint.block_number,
        };
        let attendee = self.store.record_purchase(&wallet, record).await?;

        tracing::info!(
            event = %event.name,
            wallet = %wallet,
            token = %mint.token_id,
            mint_success = mint.success,
            "ticket purchased"
        );

        Ok(PurchaseOutcome {
            token_id: mint.token_id,
            tx_hash: mint.tx_hash,
            mint_success: mint.success,
            event,
            attendee,
        })
    }

    /// Check in a wallet's purchase for an event.
    ///
    /// The local status change is authoritative; the on-chain metadata
    /// update afterwards is best-effort and a failure there is logged and
    /// swallowed.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] if the wallet has no record, or no entry
    ///   for this event
    /// - [`TicketError::AlreadyUsed`] / [`TicketError::Burned`] per current
    ///   status
    pub async fn check_in(
        &self,
        wallet_input: &str,
        event_id: &str,
    ) -> Result<CheckInOutcome, TicketError> {
        let wallet = WalletAddress::parse(wallet_input)?;

        let attendee = self
            .store
            .find_attendee(&wallet)
            .await?
            .ok_or_else(|| TicketError::not_found("No ticket found for this wallet address."))?;
        let entry = attendee
            .purchase(event_id)
            .ok_or_else(|| TicketError::not_found("User has not registered for this event."))?;

        match entry.status {
            PurchaseStatus::Attended => return Err(TicketError::AlreadyUsed),
            PurchaseStatus::Burned => return Err(TicketError::Burned),
            PurchaseStatus::ToBeAttended => {}
        }

        let updated = self
            .store
            .update_purchase_status(&wallet, event_id, PurchaseStatus::Attended)
            .await?;

        // Best-effort: only real on-chain tokens can be updated, and the
        // local transition stands either way.
        if updated.mint_success && self.chain.is_contract_ready().await {
            let post_uri = TicketMetadata::post_event(&updated, Utc::now()).into_uri();
            if let Err(err) = self.chain.update_metadata(&updated.token_id, &post_uri).await {
                tracing::warn!(
                    token = %updated.token_id,
                    error = %err,
                    "post-event metadata update failed; local check-in stands"
                );
            }
        }

        tracing::info!(wallet = %wallet, event = %updated.event_name, "wallet check-in complete");

        Ok(CheckInOutcome {
            status: PurchaseStatus::Attended,
            token_id: updated.token_id,
            event_name: updated.event_name,
        })
    }

    /// All purchase entries for a wallet, in insertion order.
    ///
    /// # Errors
    ///
    /// [`TicketError::Validation`] for a malformed address.
    pub async fn user_tickets(
        &self,
        wallet_input: &str,
    ) -> Result<Vec<PurchaseRecord>, TicketError> {
        let wallet = WalletAddress::parse(wallet_input)?;
        let attendee = self.store.find_attendee(&wallet).await?;
        Ok(attendee.map(|a| a.purchases).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Organizer flow
    // ------------------------------------------------------------------

    /// Mint a ticket to a recipient on behalf of the organizer.
    ///
    /// Validates everything before any side effect; a chain failure here is
    /// fatal for the request (no local fallback).
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] for a malformed address, unparseable
    ///   date or non-positive price
    /// - [`TicketError::ServiceUnavailable`] when the gateway or contract is
    ///   not ready
    /// - [`TicketError::Chain`] when the mint itself fails
    pub async fn mint_ticket(&self, request: MintTicketRequest) -> Result<MintedTicket, TicketError> {
        let recipient = WalletAddress::parse(&request.recipient_address)?;
        let event_date = parse_event_date(&request.event_date)?;
        if !(request.original_price.is_finite() && request.original_price > 0.0) {
            return Err(TicketError::validation("Invalid original price"));
        }

        self.require_chain_ready().await?;

        let receipt = self
            .chain
            .mint(&recipient, &request.pre_metadata_uri)
            .await?;

        let ticket = Ticket {
            token_id: receipt.token_id.clone(),
            contract_address: self.contract_address.clone(),
            owner_address: recipient,
            event_name: request.event_name,
            event_date,
            event_location: request.event_location,
            pre_metadata_uri: request.pre_metadata_uri,
            post_metadata_uri: None,
            status: TicketStatus::Minted,
            original_price: request.original_price,
            minted_at: Utc::now(),
            checked_in_at: None,
            checked_in_by: None,
        };
        self.store.insert_ticket(ticket.clone()).await?;

        tracing::info!(
            token = %receipt.token_id,
            recipient = %ticket.owner_address,
            tx = %receipt.tx_hash,
            "ticket minted"
        );

        Ok(MintedTicket { ticket, receipt })
    }

    /// Check in a ticket by token id (organizer scanning a QR code).
    ///
    /// Unlike the wallet flow, the chain metadata update here is fatal on
    /// failure: nothing is persisted unless the chain write confirmed.
    ///
    /// # Errors
    ///
    /// - [`TicketError::NotFound`] for an unknown token
    /// - [`TicketError::AlreadyUsed`] / [`TicketError::Burned`] per status
    /// - [`TicketError::ServiceUnavailable`] / [`TicketError::Chain`] for
    ///   gateway problems
    pub async fn check_in_by_token(
        &self,
        token_id: &TokenId,
        post_metadata_uri: &str,
    ) -> Result<CheckedInTicket, TicketError> {
        let ticket = self.require_ticket(token_id).await?;
        match ticket.status {
            TicketStatus::CheckedIn => return Err(TicketError::AlreadyUsed),
            TicketStatus::Burned => return Err(TicketError::Burned),
            TicketStatus::Minted => {}
        }

        self.require_chain_ready().await?;
        let receipt = self.chain.update_metadata(token_id, post_metadata_uri).await?;

        let now = Utc::now();
        let ticket = self
            .store
            .update_ticket_status(
                token_id,
                TicketStatus::CheckedIn,
                CheckInFields {
                    post_metadata_uri: Some(post_metadata_uri.to_string()),
                    checked_in_at: Some(now),
                    checked_in_by: Some("organizer".to_string()),
                },
            )
            .await?;

        tracing::info!(token = %token_id, tx = %receipt.tx_hash, "ticket checked in");

        Ok(CheckedInTicket { ticket, receipt })
    }

    /// Permanently invalidate a ticket. Administrative, terminal.
    ///
    /// # Errors
    ///
    /// As [`Self::check_in_by_token`], except an already checked-in ticket
    /// may still be burned.
    pub async fn burn_ticket(&self, token_id: &TokenId) -> Result<ChainReceipt, TicketError> {
        let ticket = self.require_ticket(token_id).await?;
        if ticket.status == TicketStatus::Burned {
            return Err(TicketError::Burned);
        }

        self.require_chain_ready().await?;
        let receipt = self.chain.burn(token_id).await?;
        self.store.burn_ticket(token_id).await?;

        tracing::info!(token = %token_id, tx = %receipt.tx_hash, "ticket burned");
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// A ticket row plus its on-chain view when the network is reachable.
    ///
    /// Chain failure degrades `blockchain` to `None`; the request still
    /// succeeds on the local data.
    ///
    /// # Errors
    ///
    /// [`TicketError::NotFound`] for an unknown token.
    pub async fn ticket(&self, token_id: &TokenId) -> Result<TicketDetails, TicketError> {
        let token = self.require_ticket(token_id).await?;

        let blockchain = if self.chain.is_ready().await {
            match self.chain.token_info(token_id).await {
                Ok(info) => Some(info),
                Err(err) => {
                    tracing::warn!(token = %token_id, error = %err, "could not fetch chain info");
                    None
                }
            }
        } else {
            None
        };

        Ok(TicketDetails { token, blockchain })
    }

    /// All tickets owned by an address, in insertion order.
    ///
    /// # Errors
    ///
    /// [`TicketError::Validation`] for a malformed address.
    pub async fn tickets_by_owner(&self, address_input: &str) -> Result<Vec<Ticket>, TicketError> {
        let owner = WalletAddress::parse(address_input)?;
        Ok(self.store.find_tickets_by_owner(&owner).await?)
    }

    /// Per-status counts plus best-effort chain total supply.
    ///
    /// # Errors
    ///
    /// [`TicketError::Store`] if the ledger store fails.
    pub async fn stats(&self) -> Result<Stats, TicketError> {
        let database = self.store.count_tickets_by_status().await?;

        let total_supply = if self.chain.is_ready().await {
            match self.chain.total_supply().await {
                Ok(supply) => Some(supply),
                Err(err) => {
                    tracing::warn!(error = %err, "could not fetch chain total supply");
                    None
                }
            }
        } else {
            None
        };

        Ok(Stats {
            database,
            total_supply,
        })
    }

    /// All events.
    ///
    /// # Errors
    ///
    /// [`TicketError::Store`] if the ledger store fails.
    pub async fn events(&self) -> Result<Vec<Event>, TicketError> {
        Ok(self.store.list_events().await?)
    }

    /// One event by id.
    ///
    /// # Errors
    ///
    /// [`TicketError::NotFound`] for an unknown event.
    pub async fn event(&self, event_id: &str) -> Result<Event, TicketError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| TicketError::not_found("Event not found."))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn require_ticket(&self, token_id: &TokenId) -> Result<Ticket, TicketError> {
        self.store
            .find_ticket(token_id)
            .await?
            .ok_or_else(|| TicketError::not_found("Ticket not found"))
    }

    async fn require_chain_ready(&self) -> Result<(), TicketError> {
        if !self.chain.is_ready().await {
            return Err(TicketError::ServiceUnavailable(
                "Web3 service not ready".to_string(),
            ));
        }
        if !self.chain.is_contract_ready().await {
            return Err(TicketError::ServiceUnavailable(
                "Smart contract not deployed".to_string(),
            ));
        }
        Ok(())
    }

    async fn mint_or_fallback(&self, wallet: &WalletAddress, metadata_uri: &str) -> MintResult {
        if self.chain.is_contract_ready().await {
            match self.chain.mint(wallet, metadata_uri).await {
                Ok(receipt) => {
                    return MintResult {
                        token_id: receipt.token_id,
                        tx_hash: receipt.tx_hash,
                        block_number: Some(receipt.block_number),
                        success: true,
                    };
                }
                Err(err) => {
                    tracing::warn!(
                        wallet = %wallet,
                        error = %err,
                        "chain mint failed; recording ticket locally"
                    );
                }
            }
        } else {
            tracing::warn!(wallet = %wallet, "contract not ready; recording ticket locally");
        }

        MintResult {
            token_id: TokenId::synthetic(),
            tx_hash: format!("local_{}", Utc::now().timestamp_millis()),
            block_number: None,
            success: false,
        }
    }
}

struct MintResult {
    token_id: TokenId,
    tx_hash: String,
    block_number: Option<u64>,
    success: bool,
}

fn parse_event_date(input: &str) -> Result<DateTime<Utc>, TicketError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc));
        }
    }
    Err(TicketError::validation("Invalid event date format"))
}
