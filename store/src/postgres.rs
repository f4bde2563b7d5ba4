//! `PostgreSQL` ledger store: the persistent variant.
//!
//! Plain `sqlx::query`/`query_as` with runtime binding (no compile-time
//! checked macros, so builds don't need a live database). Seat reservation
//! runs as a single transaction: the `purchase_claims` primary key is the
//! duplicate-purchase guard and the guarded `UPDATE ... WHERE booked_seats <
//! max_seats` is the compare-and-increment, so concurrent purchases can
//! neither double-book a wallet nor oversell an event.
//!
//! Unlike the demo variant, tickets here are never deleted: burn marks the
//! row `burned`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use std::time::Duration;
use ticketchain_core::error::StoreError;
use ticketchain_core::ledger::{CheckInFields, LedgerStore};
use ticketchain_core::types::{
    AttendeeRecord, Event, EventType, PurchaseRecord, PurchaseStatus, Ticket, TicketCounts,
    TicketStatus, TokenId, WalletAddress,
};

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Persistent ledger store backed by `PostgreSQL`.
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the connection or schema
    /// application fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await
            .map_err(backend)?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Apply the ledger schema (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if a statement fails.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// Insert the five sample events if they are not present yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if an insert fails.
    pub async fn seed_sample_events(&self) -> Result<(), StoreError> {
        for event in crate::seed::sample_events() {
            sqlx::query(
                r"
                INSERT INTO events (id, name, event_type, location, date, price, max_seats, booked_seats)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                ",
            )
            .bind(&event.id)
            .bind(&event.name)
            .bind(event.event_type.as_str())
            .bind(&event.location)
            .bind(event.date)
            .bind(event.price)
            .bind(i64::from(event.max_seats))
            .bind(i64::from(event.booked_seats))
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert_ticket(&self, ticket: Ticket) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            INSERT INTO tickets (
                token_id, contract_address, owner_address, event_name, event_date,
                event_location, pre_metadata_uri, post_metadata_uri, status,
                original_price, minted_at, checked_in_at, checked_in_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (token_id) DO NOTHING
            ",
        )
        .bind(ticket.token_id.to_string())
        .bind(&ticket.contract_address)
        .bind(ticket.owner_address.as_str())
        .bind(&ticket.event_name)
        .bind(ticket.event_date)
        .bind(&ticket.event_location)
        .bind(&ticket.pre_metadata_uri)
        .bind(&ticket.post_metadata_uri)
        .bind(ticket.status.as_str())
        .bind(ticket.original_price)
        .bind(ticket.minted_at)
        .bind(ticket.checked_in_at)
        .bind(&ticket.checked_in_by)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(ticket.token_id));
        }
        Ok(())
    }

    async fn find_ticket(&self, token_id: &TokenId) -> Result<Option<Ticket>, StoreError> {
        sqlx::query("SELECT * FROM tickets WHERE token_id = $1")
            .bind(token_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(|row| ticket_from_row(&row))
            .transpose()
    }

    async fn update_ticket_status(
        &self,
        token_id: &TokenId,
        status: TicketStatus,
        fields: CheckInFields,
    ) -> Result<Ticket, StoreError> {
        let row = sqlx::query(
            r"
            UPDATE tickets SET
                status            = $2,
                post_metadata_uri = COALESCE($3, post_metadata_uri),
                checked_in_at     = COALESCE($4, checked_in_at),
                checked_in_by     = COALESCE($5, checked_in_by)
            WHERE token_id = $1
            RETURNING *
            ",
        )
        .bind(token_id.to_string())
        .bind(status.as_str())
        .bind(fields.post_metadata_uri)
        .bind(fields.checked_in_at)
        .bind(fields.checked_in_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound("Ticket not found".to_string()))?;
        ticket_from_row(&row)
    }

    async fn burn_ticket(&self, token_id: &TokenId) -> Result<(), StoreError> {
        // Persistent variant keeps the row.
        let result = sqlx::query("UPDATE tickets SET status = 'burned' WHERE token_id = $1")
            .bind(token_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Ticket not found".to_string()));
        }
        Ok(())
    }

    async fn find_tickets_by_owner(
        &self,
        owner: &WalletAddress,
    ) -> Result<Vec<Ticket>, StoreError> {
        let rows = sqlx::query("SELECT * FROM tickets WHERE owner_address = $1 ORDER BY seq")
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn count_tickets_by_status(&self) -> Result<TicketCounts, StoreError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM tickets GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut counts = TicketCounts::default();
        for row in rows {
            let status: String = row.try_get("status").map_err(backend)?;
            let n: i64 = row.try_get("n").map_err(backend)?;
            let n = u64::try_from(n).unwrap_or(0);
            counts.total += n;
            match status.as_str() {
                "minted" => counts.minted += n,
                "checked_in" => counts.checked_in += n,
                "burned" => counts.burned += n,
                other => return Err(corrupt(format!("unknown ticket status {other:?}"))),
            }
        }
        Ok(counts)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        sqlx::query("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(|row| event_from_row(&row))
            .transpose()
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query("SELECT * FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(event_from_row).collect()
    }

    async fn reserve_seat(
        &self,
        event_id: &str,
        wallet: &WalletAddress,
    ) -> Result<Event, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // The claims primary key is the duplicate guard.
        let claimed = sqlx::query(
            "INSERT INTO purchase_claims (wallet, event_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(wallet.as_str())
        .bind(event_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;
        if claimed.rows_affected() == 0 {
            return Err(StoreError::DuplicatePurchase);
        }

        // Compare-and-increment; zero rows means missing or sold out.
        let incremented = sqlx::query(
            "UPDATE events SET booked_seats = booked_seats + 1 WHERE id = $1 AND booked_seats < max_seats",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;
        if incremented.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?
                .is_some();
            return Err(if exists {
                StoreError::SeatsExhausted
            } else {
                StoreError::NotFound("Event not found.".to_string())
            });
        }

        let row = sqlx::query("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(backend)?;
        let event = event_from_row(&row)?;

        tx.commit().await.map_err(backend)?;
        Ok(event)
    }

    async fn record_purchase(
        &self,
        wallet: &WalletAddress,
        record: PurchaseRecord,
    ) -> Result<AttendeeRecord, StoreError> {
        sqlx::query(
            r"
            INSERT INTO purchases (
                wallet, event_id, event_name, event_type, status, purchased_at,
                event_date, event_location, token_id, tx_hash, metadata_uri,
                mint_success, block_number
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(wallet.as_str())
        .bind(&record.event_id)
        .bind(&record.event_name)
        .bind(record.event_type.as_str())
        .bind(purchase_status_str(record.status))
        .bind(record.purchased_at)
        .bind(record.event_date)
        .bind(&record.event_location)
        .bind(record.token_id.to_string())
        .bind(&record.tx_hash)
        .bind(&record.metadata_uri)
        .bind(record.mint_success)
        .bind(record.block_number.and_then(|n| i64::try_from(n).ok()))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        self.find_attendee(wallet)
            .await?
            .ok_or_else(|| corrupt("attendee record missing after insert"))
    }

    async fn find_attendee(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Option<AttendeeRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM purchases WHERE wallet = $1 ORDER BY seq")
            .bind(wallet.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut attendee = AttendeeRecord::new(wallet.clone());
        for row in &rows {
            attendee.push(purchase_from_row(row)?);
        }
        Ok(Some(attendee))
    }

    async fn update_purchase_status(
        &self,
        wallet: &WalletAddress,
        event_id: &str,
        status: PurchaseStatus,
    ) -> Result<PurchaseRecord, StoreError> {
        let row = sqlx::query(
            "UPDATE purchases SET status = $3 WHERE wallet = $1 AND event_id = $2 RETURNING *",
        )
        .bind(wallet.as_str())
        .bind(event_id)
        .bind(purchase_status_str(status))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| {
            StoreError::NotFound("User has not registered for this event.".to_string())
        })?;
        purchase_from_row(&row)
    }
}

// ----------------------------------------------------------------------
// Row mapping
// ----------------------------------------------------------------------

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn corrupt(message: impl Into<String>) -> StoreError {
    StoreError::Backend(message.into())
}

const fn purchase_status_str(status: PurchaseStatus) -> &'static str {
    match status {
        PurchaseStatus::ToBeAttended => "toBeAttended",
        PurchaseStatus::Attended => "Attended",
        PurchaseStatus::Burned => "Burned",
    }
}

fn purchase_status_from_str(s: &str) -> Result<PurchaseStatus, StoreError> {
    match s {
        "toBeAttended" => Ok(PurchaseStatus::ToBeAttended),
        "Attended" => Ok(PurchaseStatus::Attended),
        "Burned" => Ok(PurchaseStatus::Burned),
        other => Err(corrupt(format!("unknown purchase status {other:?}"))),
    }
}

fn ticket_status_from_str(s: &str) -> Result<TicketStatus, StoreError> {
    match s {
        "minted" => Ok(TicketStatus::Minted),
        "checked_in" => Ok(TicketStatus::CheckedIn),
        "burned" => Ok(TicketStatus::Burned),
        other => Err(corrupt(format!("unknown ticket status {other:?}"))),
    }
}

fn event_type_from_str(s: &str) -> EventType {
    match s {
        "tech" => EventType::Tech,
        "art" => EventType::Art,
        "music" => EventType::Music,
        "business" => EventType::Business,
        "sports" => EventType::Sports,
        _ => EventType::Other,
    }
}

fn wallet_col(row: &PgRow, col: &str) -> Result<WalletAddress, StoreError> {
    let raw: String = row.try_get(col).map_err(backend)?;
    WalletAddress::parse(&raw).map_err(|_| corrupt(format!("corrupt wallet address {raw:?}")))
}

fn token_col(row: &PgRow, col: &str) -> Result<TokenId, StoreError> {
    let raw: String = row.try_get(col).map_err(backend)?;
    TokenId::from_str(&raw).map_err(|_| corrupt(format!("corrupt token id {raw:?}")))
}

fn ticket_from_row(row: &PgRow) -> Result<Ticket, StoreError> {
    let status: String = row.try_get("status").map_err(backend)?;
    Ok(Ticket {
        token_id: token_col(row, "token_id")?,
        contract_address: row.try_get("contract_address").map_err(backend)?,
        owner_address: wallet_col(row, "owner_address")?,
        event_name: row.try_get("event_name").map_err(backend)?,
        event_date: row.try_get("event_date").map_err(backend)?,
        event_location: row.try_get("event_location").map_err(backend)?,
        pre_metadata_uri: row.try_get("pre_metadata_uri").map_err(backend)?,
        post_metadata_uri: row.try_get("post_metadata_uri").map_err(backend)?,
        status: ticket_status_from_str(&status)?,
        original_price: row.try_get("original_price").map_err(backend)?,
        minted_at: row.try_get("minted_at").map_err(backend)?,
        checked_in_at: row.try_get("checked_in_at").map_err(backend)?,
        checked_in_by: row.try_get("checked_in_by").map_err(backend)?,
    })
}

fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let event_type: String = row.try_get("event_type").map_err(backend)?;
    let max_seats: i32 = row.try_get("max_seats").map_err(backend)?;
    let booked_seats: i32 = row.try_get("booked_seats").map_err(backend)?;
    Ok(Event {
        id: row.try_get("id").map_err(backend)?,
        name: row.try_get("name").map_err(backend)?,
        event_type: event_type_from_str(&event_type),
        location: row.try_get("location").map_err(backend)?,
        date: row.try_get("date").map_err(backend)?,
        price: row.try_get("price").map_err(backend)?,
        max_seats: u32::try_from(max_seats).unwrap_or(0),
        booked_seats: u32::try_from(booked_seats).unwrap_or(0),
    })
}

fn purchase_from_row(row: &PgRow) -> Result<PurchaseRecord, StoreError> {
    let status: String = row.try_get("status").map_err(backend)?;
    let event_type: String = row.try_get("event_type").map_err(backend)?;
    let block_number: Option<i64> = row.try_get("block_number").map_err(backend)?;
    let purchased_at: DateTime<Utc> = row.try_get("purchased_at").map_err(backend)?;
    Ok(PurchaseRecord {
        event_id: row.try_get("event_id").map_err(backend)?,
        event_name: row.try_get("event_name").map_err(backend)?,
        event_type: event_type_from_str(&event_type),
        status: purchase_status_from_str(&status)?,
        purchased_at,
        event_date: row.try_get("event_date").map_err(backend)?,
        event_location: row.try_get("event_location").map_err(backend)?,
        token_id: token_col(row, "token_id")?,
        tx_hash: row.try_get("tx_hash").map_err(backend)?,
        metadata_uri: row.try_get("metadata_uri").map_err(backend)?,
        mint_success: row.try_get("mint_success").map_err(backend)?,
        block_number: block_number.and_then(|n| u64::try_from(n).ok()),
    })
}
