//! NFT metadata payload construction.
//!
//! The purchase flow embeds event attributes into the token metadata at mint
//! time and swaps in an "attended" payload at check-in. The payload is the
//! standard `name`/`description`/`image`/`attributes` shape serialized to a
//! JSON string and used directly as the metadata URI.

use crate::types::{Event, PurchaseRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PRE_EVENT_IMAGE: &str =
    "https://via.placeholder.com/400x400/6366f1/ffffff?text=Event+Ticket";
const POST_EVENT_IMAGE: &str =
    "https://via.placeholder.com/400x400/10b981/ffffff?text=Event+Attended";

/// A single `trait_type`/`value` pair in the metadata attribute list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    /// Attribute name.
    pub trait_type: String,
    /// Attribute value, always rendered as a string.
    pub value: String,
}

/// The metadata payload a ticket token points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMetadata {
    /// Token display name.
    pub name: String,
    /// Token description.
    pub description: String,
    /// Artwork URL.
    pub image: String,
    /// Event attributes embedded at mint / check-in time.
    pub attributes: Vec<MetadataAttribute>,
}

fn attribute(trait_type: &str, value: impl Into<String>) -> MetadataAttribute {
    MetadataAttribute {
        trait_type: trait_type.to_string(),
        value: value.into(),
    }
}

impl TicketMetadata {
    /// Payload minted with a fresh ticket for `event`.
    #[must_use]
    pub fn pre_event(event: &Event) -> Self {
        Self {
            name: format!("{} - Ticket", event.name),
            description: format!("NFT Ticket for {}", event.name),
            image: PRE_EVENT_IMAGE.to_string(),
            attributes: vec![
                attribute("Event Name", event.name.clone()),
                attribute("Event Type", event.event_type.as_str()),
                attribute("Event Date", event.date.to_rfc3339()),
                attribute("Event Location", event.location.clone()),
                attribute("Ticket Status", "Active"),
            ],
        }
    }

    /// Payload swapped in when a purchase is checked in.
    #[must_use]
    pub fn post_event(record: &PurchaseRecord, checked_in_at: DateTime<Utc>) -> Self {
        Self {
            name: format!("{} - Attended", record.event_name),
            description: format!("NFT Ticket for {} - Event Attended", record.event_name),
            image: POST_EVENT_IMAGE.to_string(),
            attributes: vec![
                attribute("Event Name", record.event_name.clone()),
                attribute("Event Type", record.event_type.as_str()),
                attribute("Event Date", record.event_date.to_rfc3339()),
                attribute("Event Location", record.event_location.clone()),
                attribute("Ticket Status", "Attended"),
                attribute("Check-in Date", checked_in_at.to_rfc3339()),
            ],
        }
    }

    /// Serialize the payload into the string used as the metadata URI.
    #[must_use]
    pub fn into_uri(self) -> String {
        // A struct of strings cannot fail to serialize.
        serde_json::to_string(&self).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::EventType;

    fn sample_event() -> Event {
        Event {
            id: "1".to_string(),
            name: "Blockchain Summit".to_string(),
            event_type: EventType::Tech,
            location: "San Francisco, CA".to_string(),
            date: Utc::now(),
            price: 149.99,
            max_seats: 300,
            booked_seats: 89,
        }
    }

    #[test]
    fn pre_event_payload_embeds_event_attributes() {
        let event = sample_event();
        let uri = TicketMetadata::pre_event(&event).into_uri();
        let parsed: TicketMetadata = serde_json::from_str(&uri).expect("valid payload JSON");

        assert_eq!(parsed.name, "Blockchain Summit - Ticket");
        let status = parsed
            .attributes
            .iter()
            .find(|a| a.trait_type == "Ticket Status")
            .expect("status attribute present");
        assert_eq!(status.value, "Active");
        assert!(
            parsed
                .attributes
                .iter()
                .any(|a| a.trait_type == "Event Location" && a.value == "San Francisco, CA")
        );
    }

    #[test]
    fn post_event_payload_marks_attended_and_stamps_checkin() {
        let event = sample_event();
        let record = PurchaseRecord {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_type: event.event_type,
            status: crate::types::PurchaseStatus::Attended,
            purchased_at: Utc::now(),
            event_date: event.date,
            event_location: event.location.clone(),
            token_id: crate::types::TokenId::OnChain(1),
            tx_hash: "0xabc".to_string(),
            metadata_uri: String::new(),
            mint_success: true,
            block_number: Some(1),
        };
        let at = Utc::now();
        let payload = TicketMetadata::post_event(&record, at);

        assert_eq!(payload.name, "Blockchain Summit - Attended");
        assert!(
            payload
                .attributes
                .iter()
                .any(|a| a.trait_type == "Ticket Status" && a.value == "Attended")
        );
        assert!(
            payload
                .attributes
                .iter()
                .any(|a| a.trait_type == "Check-in Date" && a.value == at.to_rfc3339())
        );
    }
}
