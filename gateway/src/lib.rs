//! Chain gateway implementations for Ticketchain.
//!
//! Two implementations of [`ticketchain_core::ChainGateway`]:
//!
//! - [`SimulatedChain`]: deterministic in-process chain. Token ids count up
//!   from 1, receipts carry synthetic hashes, nothing leaves the process.
//!   This is the demo backend and the test double.
//! - [`RelayerGateway`]: HTTP client for the relayer sidecar that holds the
//!   organizer signing key and talks to the real network. The backend never
//!   touches key material itself.

pub mod relayer;
pub mod simulated;

pub use relayer::{RelayerConfig, RelayerGateway};
pub use simulated::SimulatedChain;
