//! Sample events the demo store is seeded with.

use chrono::{DateTime, NaiveDate, Utc};
use ticketchain_core::{Event, EventType};

fn midnight_utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or_else(Utc::now, |naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// The five sample events every demo deployment starts with.
#[must_use]
pub fn sample_events() -> Vec<Event> {
    vec![
        Event {
            id: "1".to_string(),
            name: "MAD(wo)MEN Launch Party".to_string(),
            event_type: EventType::Tech,
            location: "New York City, NY".to_string(),
            date: midnight_utc(2025, 1, 15),
            price: 99.99,
            max_seats: 500,
            booked_seats: 127,
        },
        Event {
            id: "2".to_string(),
            name: "Blockchain & Web3 Summit".to_string(),
            event_type: EventType::Tech,
            location: "San Francisco, CA".to_string(),
            date: midnight_utc(2025, 2, 20),
            price: 149.99,
            max_seats: 300,
            booked_seats: 89,
        },
        Event {
            id: "3".to_string(),
            name: "Tech Innovation Conference".to_string(),
            event_type: EventType::Tech,
            location: "Austin, TX".to_string(),
            date: midnight_utc(2025, 3, 10),
            price: 79.99,
            max_seats: 400,
            booked_seats: 156,
        },
        Event {
            id: "4".to_string(),
            name: "Digital Art Exhibition".to_string(),
            event_type: EventType::Art,
            location: "Los Angeles, CA".to_string(),
            date: midnight_utc(2025, 4, 5),
            price: 45.00,
            max_seats: 200,
            booked_seats: 78,
        },
        Event {
            id: "5".to_string(),
            name: "Music Festival 2025".to_string(),
            event_type: EventType::Music,
            location: "Miami, FL".to_string(),
            date: midnight_utc(2025, 5, 15),
            price: 199.99,
            max_seats: 1000,
            booked_seats: 234,
        },
    ]
}
