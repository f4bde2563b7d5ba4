//! Domain types for the ticketing system.
//!
//! Everything here is a plain value type: validation happens at construction
//! (`WalletAddress`, `TokenId`) and the rest is data carried between the
//! ledger store, the chain gateway and the lifecycle manager.
//!
//! Serde renames follow the wire format the frontend already consumes
//! (`tokenId`, `preEventMetadataURI`, `nftMintSuccess`, ...), so these types
//! serialize directly into API responses without mapping layers.

use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Wallet addresses
// ============================================================================

/// Error returned when a wallet address does not match the
/// `0x` + 40-hex-digit format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid Ethereum address format")]
pub struct InvalidAddress;

/// A lowercase-normalized Ethereum wallet address.
///
/// Construction validates the fixed `0x` + 40-hex-digit format, so a value of
/// this type is guaranteed well-formed and safe to forward to the chain
/// gateway. Mixed-case input is accepted and normalized to lowercase, which
/// makes addresses directly comparable as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and normalize a wallet address.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAddress`] if the input is not `0x` followed by
    /// exactly 40 hex digits.
    pub fn parse(input: &str) -> Result<Self, InvalidAddress> {
        let trimmed = input.trim();
        let hex = trimmed.strip_prefix("0x").ok_or(InvalidAddress)?;
        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidAddress);
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The normalized address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

// ============================================================================
// Token identifiers
// ============================================================================

/// Error returned when a token identifier cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid token ID")]
pub struct InvalidTokenId;

/// Identifier of an issued ticket.
///
/// Tickets minted on chain carry the contract's numeric token id. When the
/// chain write fails the purchase flow still records the ticket locally under
/// a synthetic `local_...` identifier (the ledger store stays authoritative
/// for ownership), so both shapes must round-trip through the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenId {
    /// Numeric token id assigned by the contract at mint time. Never zero.
    OnChain(u64),
    /// Synthetic identifier for tickets recorded under the local-fallback
    /// policy.
    Local(String),
}

impl TokenId {
    /// Generate a fresh synthetic identifier for a local-fallback ticket.
    #[must_use]
    pub fn synthetic() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(char::from)
            .collect();
        Self::Local(format!(
            "local_{}_{}",
            Utc::now().timestamp_millis(),
            suffix.to_ascii_lowercase()
        ))
    }

    /// Whether this is a local-fallback identifier (no on-chain counterpart).
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// The on-chain numeric id, if any.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::OnChain(n) => Some(*n),
            Self::Local(_) => None,
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnChain(n) => write!(f, "{n}"),
            Self::Local(s) => f.write_str(s),
        }
    }
}

impl FromStr for TokenId {
    type Err = InvalidTokenId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            // Contract token ids start at 1.
            return if n == 0 { Err(InvalidTokenId) } else { Ok(Self::OnChain(n)) };
        }
        if s.starts_with("local_") {
            return Ok(Self::Local(s.to_string()));
        }
        Err(InvalidTokenId)
    }
}

// Serialized as a string in either form, matching what the contract wrapper
// and the frontend exchange today.
impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(0) => Err(serde::de::Error::custom("Invalid token ID")),
            Repr::Num(n) => Ok(Self::OnChain(n)),
            Repr::Text(s) => Self::from_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Lifecycle status of a ticket.
///
/// `minted -> checked_in` is the only regular transition; `burned` is an
/// administrative terminal state reachable from either. There is no path back
/// to `minted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Issued and valid for check-in.
    Minted,
    /// Consumed at the venue. Terminal.
    CheckedIn,
    /// Administratively invalidated. Terminal.
    Burned,
}

impl TicketStatus {
    /// Wire-format name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minted => "minted",
            Self::CheckedIn => "checked_in",
            Self::Burned => "burned",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issued admission right, as persisted in the ledger store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique token identifier, assigned at mint time. Immutable.
    pub token_id: TokenId,
    /// Address of the contract the token lives on.
    pub contract_address: String,
    /// Lowercase-normalized owner wallet. Set at mint, never reassigned
    /// (no transfer flow).
    pub owner_address: WalletAddress,
    /// Name of the associated event.
    pub event_name: String,
    /// When the event takes place.
    pub event_date: DateTime<Utc>,
    /// Where the event takes place.
    pub event_location: String,
    /// Metadata pointer for the pre-event state.
    #[serde(rename = "preEventMetadataURI")]
    pub pre_metadata_uri: String,
    /// Metadata pointer for the post-event state. `Some` iff checked in.
    #[serde(rename = "postEventMetadataURI")]
    pub post_metadata_uri: Option<String>,
    /// Current lifecycle status.
    pub status: TicketStatus,
    /// Original sale price. Strictly positive.
    pub original_price: f64,
    /// When the ticket was minted.
    pub minted_at: DateTime<Utc>,
    /// When the ticket was checked in. `Some` iff checked in.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Who performed the check-in.
    pub checked_in_by: Option<String>,
}

impl Ticket {
    /// Whether the ticket is still valid for check-in.
    #[must_use]
    pub fn can_check_in(&self) -> bool {
        self.status == TicketStatus::Minted
    }
}

/// Aggregate per-status ticket counts, for the statistics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCounts {
    /// All tickets currently in the ledger store.
    #[serde(rename = "totalTickets")]
    pub total: u64,
    /// Tickets minted and not yet consumed.
    #[serde(rename = "mintedTickets")]
    pub minted: u64,
    /// Tickets consumed at the venue.
    #[serde(rename = "checkedInTickets")]
    pub checked_in: u64,
    /// Tickets administratively invalidated.
    #[serde(rename = "burnedTickets")]
    pub burned: u64,
}

// ============================================================================
// Events
// ============================================================================

/// Category of a purchasable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Technology conferences and launches.
    Tech,
    /// Exhibitions and galleries.
    Art,
    /// Concerts and festivals.
    Music,
    /// Business and networking events.
    Business,
    /// Sporting events.
    Sports,
    /// Anything else.
    #[serde(other)]
    Other,
}

impl EventType {
    /// Wire-format name of the event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tech => "tech",
            Self::Art => "art",
            Self::Music => "music",
            Self::Business => "business",
            Self::Sports => "sports",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable occasion.
///
/// Invariant: `0 <= booked_seats <= max_seats`. `booked_seats` is only ever
/// incremented (by a successful purchase); there is no refund or cancel flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub event_type: EventType,
    /// Venue / city.
    pub location: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Ticket price.
    pub price: f64,
    /// Seat capacity.
    pub max_seats: u32,
    /// Seats consumed by purchases so far.
    pub booked_seats: u32,
}

impl Event {
    /// Whether at least one seat is still available.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.booked_seats < self.max_seats
    }

    /// Seats still available for purchase.
    #[must_use]
    pub const fn seats_remaining(&self) -> u32 {
        self.max_seats.saturating_sub(self.booked_seats)
    }
}

// ============================================================================
// Attendee records (wallet-flow purchases)
// ============================================================================

/// Status of a wallet-flow purchase entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseStatus {
    /// Purchased, event not yet attended.
    #[serde(rename = "toBeAttended")]
    ToBeAttended,
    /// Checked in at the venue. Terminal.
    #[serde(rename = "Attended")]
    Attended,
    /// Administratively invalidated. Terminal.
    #[serde(rename = "Burned")]
    Burned,
}

/// One purchase made by a wallet for one event, including the NFT linkage.
///
/// `mint_success == false` marks a local-fallback ticket: the chain write
/// failed (or the contract was not deployed) and the `token_id` is synthetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Event this purchase is for.
    #[serde(rename = "eventId")]
    pub event_id: String,
    /// Event name at purchase time.
    #[serde(rename = "eventName")]
    pub event_name: String,
    /// Event category at purchase time.
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    /// Current status of this admission right.
    pub status: PurchaseStatus,
    /// When the purchase was made.
    #[serde(rename = "purchaseDate")]
    pub purchased_at: DateTime<Utc>,
    /// When the event takes place.
    #[serde(rename = "eventDate")]
    pub event_date: DateTime<Utc>,
    /// Where the event takes place.
    #[serde(rename = "eventLocation")]
    pub event_location: String,
    /// Token backing this purchase (on-chain or synthetic).
    #[serde(rename = "nftTokenId")]
    pub token_id: TokenId,
    /// Transaction hash of the mint (synthetic for local fallbacks).
    #[serde(rename = "nftTransactionHash")]
    pub tx_hash: String,
    /// Metadata payload the token was minted with.
    #[serde(rename = "nftMetadataURI")]
    pub metadata_uri: String,
    /// Whether the chain mint actually succeeded.
    #[serde(rename = "nftMintSuccess")]
    pub mint_success: bool,
    /// Block the mint landed in, when it succeeded.
    #[serde(rename = "nftBlockNumber")]
    pub block_number: Option<u64>,
}

/// Per-wallet purchase history: an insertion-ordered mapping of event id to
/// purchase entry, plus a count-by-event-type side index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    /// Owning wallet.
    #[serde(rename = "walletAddress")]
    pub wallet: WalletAddress,
    /// Purchases in insertion order.
    pub purchases: Vec<PurchaseRecord>,
    /// Number of purchases per event category.
    #[serde(rename = "eventCounts")]
    pub event_counts: HashMap<EventType, u32>,
}

impl AttendeeRecord {
    /// Create an empty record for a wallet's first purchase.
    #[must_use]
    pub fn new(wallet: WalletAddress) -> Self {
        Self {
            wallet,
            purchases: Vec::new(),
            event_counts: HashMap::new(),
        }
    }

    /// Look up the purchase entry for an event.
    #[must_use]
    pub fn purchase(&self, event_id: &str) -> Option<&PurchaseRecord> {
        self.purchases.iter().find(|p| p.event_id == event_id)
    }

    /// Append a purchase and bump the per-type counter.
    pub fn push(&mut self, record: PurchaseRecord) {
        *self.event_counts.entry(record.event_type).or_insert(0) += 1;
        self.purchases.push(record);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn address_is_lowercase_normalized() {
        let addr = WalletAddress::parse("0xAbCdEf1234567890aBcDeF1234567890ABCDEF12")
            .expect("valid address");
        assert_eq!(addr.as_str(), "0xabcdef1234567890abcdef1234567890abcdef12");
    }

    #[test]
    fn address_rejects_malformed_input() {
        for bad in [
            "",
            "0x",
            "abcdef1234567890abcdef1234567890abcdef12",   // no prefix
            "0xabcdef1234567890abcdef1234567890abcdef1",  // 39 digits
            "0xabcdef1234567890abcdef1234567890abcdef123", // 41 digits
            "0xabcdef1234567890abcdef1234567890abcdefgg", // non-hex
        ] {
            assert!(WalletAddress::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn token_id_parses_numeric_and_local_forms() {
        assert_eq!("42".parse::<TokenId>(), Ok(TokenId::OnChain(42)));
        assert_eq!(
            "local_17_abc".parse::<TokenId>(),
            Ok(TokenId::Local("local_17_abc".to_string()))
        );
        assert!("0".parse::<TokenId>().is_err());
        assert!("-3".parse::<TokenId>().is_err());
        assert!("nope".parse::<TokenId>().is_err());
    }

    #[test]
    fn token_id_deserializes_from_number_or_string() {
        let n: TokenId = serde_json::from_str("7").expect("number form");
        assert_eq!(n, TokenId::OnChain(7));
        let s: TokenId = serde_json::from_str("\"7\"").expect("string form");
        assert_eq!(s, TokenId::OnChain(7));
        let l: TokenId = serde_json::from_str("\"local_1_x\"").expect("local form");
        assert!(l.is_local());
        assert!(serde_json::from_str::<TokenId>("0").is_err());
    }

    #[test]
    fn synthetic_token_ids_are_local_and_distinct() {
        let a = TokenId::synthetic();
        let b = TokenId::synthetic();
        assert!(a.is_local());
        assert!(a.to_string().starts_with("local_"));
        assert_ne!(a, b);
    }

    #[test]
    fn status_wire_names_are_stable() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::CheckedIn).expect("serialize"),
            "\"checked_in\""
        );
        assert_eq!(
            serde_json::to_string(&PurchaseStatus::ToBeAttended).expect("serialize"),
            "\"toBeAttended\""
        );
        assert_eq!(
            serde_json::to_string(&PurchaseStatus::Attended).expect("serialize"),
            "\"Attended\""
        );
    }

    #[test]
    fn unknown_event_type_falls_back_to_other() {
        let t: EventType = serde_json::from_str("\"circus\"").expect("deserialize");
        assert_eq!(t, EventType::Other);
    }

    #[test]
    fn attendee_record_tracks_per_type_counts() {
        let wallet = WalletAddress::parse("0x1111111111111111111111111111111111111111")
            .expect("valid address");
        let mut record = AttendeeRecord::new(wallet);
        for (id, ty) in [("1", EventType::Tech), ("2", EventType::Tech), ("4", EventType::Art)] {
            record.push(PurchaseRecord {
                event_id: id.to_string(),
                event_name: format!("event {id}"),
                event_type: ty,
                status: PurchaseStatus::ToBeAttended,
                purchased_at: Utc::now(),
                event_date: Utc::now(),
                event_location: "NYC".to_string(),
                token_id: TokenId::synthetic(),
                tx_hash: "local_0".to_string(),
                metadata_uri: "{}".to_string(),
                mint_success: false,
                block_number: None,
            });
        }
        assert_eq!(record.event_counts[&EventType::Tech], 2);
        assert_eq!(record.event_counts[&EventType::Art], 1);
        assert!(record.purchase("2").is_some());
        assert!(record.purchase("9").is_none());
    }

    proptest! {
        #[test]
        fn valid_addresses_always_roundtrip(hex in "[0-9a-fA-F]{40}") {
            let input = format!("0x{hex}");
            let parsed = WalletAddress::parse(&input).expect("valid address");
            prop_assert_eq!(parsed.as_str(), input.to_ascii_lowercase());
            // Parsing the normalized form is idempotent.
            let again = WalletAddress::parse(parsed.as_str()).expect("still valid");
            prop_assert_eq!(again, parsed);
        }

        #[test]
        fn numeric_token_ids_roundtrip_through_display(n in 1u64..u64::MAX) {
            let id = TokenId::OnChain(n);
            let parsed: TokenId = id.to_string().parse().expect("roundtrip");
            prop_assert_eq!(parsed, id);
        }
    }
}
