//! Ledger store implementations for Ticketchain.
//!
//! Two backends behind the one [`ticketchain_core::LedgerStore`] contract:
//!
//! - [`MemoryLedgerStore`]: the demo variant. Everything lives behind a
//!   single async mutex, which makes the seat-reservation critical section
//!   trivially atomic. Burn removes the row.
//! - [`PostgresLedgerStore`]: the persistent variant. Seat reservation runs
//!   as one transaction (claim insert + guarded increment), tickets are
//!   never deleted, burn marks the row.
//!
//! Both ship with the same five sample events (see [`seed`]) so the demo
//! endpoints have something to sell.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
