//! HTTP-level tests over the full router, in-memory store and simulated
//! chain.

#![allow(clippy::expect_used, clippy::panic)]

use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use ticketchain_core::LifecycleManager;
use ticketchain_gateway::SimulatedChain;
use ticketchain_store::MemoryLedgerStore;
use ticketchain_web::{AppState, WalletSession, build_router};

const CONTRACT: &str = "0x00000000000000000000000000000000000000aa";
const WALLET: &str = "0x00000000000000000000000000000000000000b1";

fn server() -> TestServer {
    server_with(SimulatedChain::new())
}

fn server_with(chain: SimulatedChain) -> TestServer {
    let store = Arc::new(MemoryLedgerStore::with_sample_events());
    let chain: Arc<dyn ticketchain_core::ChainGateway> = Arc::new(chain);
    let manager = Arc::new(LifecycleManager::new(store, Arc::clone(&chain), CONTRACT));
    let wallet = Arc::new(WalletSession::new(chain));
    TestServer::new(build_router(AppState::new(manager, wallet))).expect("test server")
}

#[tokio::test]
async fn health_and_ready_respond() {
    let server = server();

    let res = server.get("/health").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["status"], "OK");

    let res = server.get("/ready").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["ready"], true);
    assert_eq!(body["contractReady"], true);
}

#[tokio::test]
async fn events_are_listed_and_fetched() {
    let server = server();

    let res = server.get("/api/events").await;
    res.assert_status_ok();
    let events: Value = res.json();
    assert_eq!(events.as_array().expect("array").len(), 5);

    let res = server.get("/api/events/1").await;
    res.assert_status_ok();
    let event: Value = res.json();
    assert_eq!(event["name"], "MAD(wo)MEN Launch Party");
    assert_eq!(event["bookedSeats"], 127);

    let res = server.get("/api/events/999").await;
    res.assert_status_not_found();

    let res = server.post("/api/events").json(&json!({})).await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "Event creation not supported in test mode");
}

#[tokio::test]
async fn purchase_and_wallet_check_in_round_trip() {
    let server = server();

    let res = server
        .post("/api/tickets/purchase")
        .json(&json!({"eventId": "1", "userWalletAddress": WALLET}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["nftMintSuccess"], true);
    assert_eq!(body["data"]["event"]["bookedSeats"], 128);
    assert_eq!(body["data"]["tokenId"], "1");

    // Duplicate purchase is a 400 with the user-facing message.
    let res = server
        .post("/api/tickets/purchase")
        .json(&json!({"eventId": "1", "userWalletAddress": WALLET}))
        .await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(
        body["error"],
        "You have already purchased a ticket for this event."
    );

    // The wallet's ticket list shows the purchase.
    let res = server.get(&format!("/api/tickets/user/{WALLET}")).await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"][0]["eventId"], "1");
    assert_eq!(body["data"][0]["status"], "toBeAttended");

    // First check-in succeeds...
    let res = server
        .post("/api/tickets/check-in")
        .json(&json!({"userWalletAddress": WALLET, "eventId": "1"}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Check-in successful! Welcome to the event.");
    assert_eq!(body["eventStatus"], "Attended");

    // ...and the repeat is a structured rejection, still HTTP 200.
    let res = server
        .post("/api/tickets/check-in")
        .json(&json!({"userWalletAddress": WALLET, "eventId": "1"}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "This ticket has already been used.");
}

#[tokio::test]
async fn purchase_validation_failures() {
    let server = server();

    let res = server
        .post("/api/tickets/purchase")
        .json(&json!({"eventId": "1"}))
        .await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "Missing required fields");

    let res = server
        .post("/api/tickets/purchase")
        .json(&json!({"eventId": "999", "userWalletAddress": WALLET}))
        .await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "Event not found.");
}

#[tokio::test]
async fn purchase_falls_back_when_the_chain_rejects_mints() {
    let server = server_with(SimulatedChain::failing_mints());

    let res = server
        .post("/api/tickets/purchase")
        .json(&json!({"eventId": "1", "userWalletAddress": WALLET}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["nftMintSuccess"], false);
    let token = body["data"]["tokenId"].as_str().expect("token string");
    assert!(token.starts_with("local_"));
}

#[tokio::test]
async fn organizer_mint_and_check_in() {
    let server = server();

    // Missing fields list the full requirement set.
    let res = server.post("/api/tickets/mint").json(&json!({})).await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["required"].as_array().expect("list").len(), 6);

    let res = server
        .post("/api/tickets/mint")
        .json(&json!({
            "recipientAddress": WALLET,
            "eventName": "Gala Night",
            "eventDate": "2025-06-01",
            "eventLocation": "Berlin",
            "preEventMetadataURI": "{\"name\":\"Gala Night - Ticket\"}",
            "originalPrice": 120.0
        }))
        .await;
    res.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = res.json();
    assert_eq!(body["data"]["tokenId"], "1");
    assert_eq!(body["data"]["status"], "minted");

    // Fetch by token id, chain view included.
    let res = server.get("/api/tickets/1").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["token"]["status"], "minted");
    assert_eq!(body["data"]["blockchain"]["isUsed"], false);

    let res = server.get("/api/tickets/abc").await;
    res.assert_status_bad_request();

    // Organizer check-in with a numeric token id in the body.
    let res = server
        .post("/api/tickets/checkIn")
        .json(&json!({"tokenId": 1, "postEventMetadataURI": "{\"attended\":true}"}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["status"], "checked_in");

    let res = server
        .post("/api/tickets/checkIn")
        .json(&json!({"tokenId": 1, "postEventMetadataURI": "{}"}))
        .await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "Ticket has already been checked in");
}

#[tokio::test]
async fn owner_and_stats_queries() {
    let server = server();

    let res = server
        .post("/api/tickets/mint")
        .json(&json!({
            "recipientAddress": WALLET,
            "eventName": "Gala Night",
            "eventDate": "2025-06-01",
            "eventLocation": "Berlin",
            "preEventMetadataURI": "{}",
            "originalPrice": 50.0
        }))
        .await;
    res.assert_status(axum::http::StatusCode::CREATED);

    let res = server.get(&format!("/api/tickets/owner/{WALLET}")).await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["count"], 1);

    let res = server.get("/api/tickets/owner/not-an-address").await;
    res.assert_status_bad_request();

    let res = server.get("/api/tickets/stats").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["database"]["totalTickets"], 1);
    assert_eq!(body["data"]["database"]["mintedTickets"], 1);
    assert_eq!(body["data"]["blockchain"]["totalSupply"], 1);
}

#[tokio::test]
async fn mint_requires_the_chain() {
    let server = server_with(SimulatedChain::offline());

    let res = server
        .post("/api/tickets/mint")
        .json(&json!({
            "recipientAddress": WALLET,
            "eventName": "Gala Night",
            "eventDate": "2025-06-01",
            "eventLocation": "Berlin",
            "preEventMetadataURI": "{}",
            "originalPrice": 50.0
        }))
        .await;
    res.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json();
    assert_eq!(body["error"], "Web3 service not ready");
}

#[tokio::test]
async fn wallet_session_endpoints() {
    let server = server();

    // Nothing connected yet.
    let res = server.get("/api/wallet/address").await;
    res.assert_status_not_found();

    let res = server.get("/api/wallet/status").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["connected"], false);

    let res = server.post("/api/wallet/switch-network").await;
    res.assert_status_bad_request();

    // Connect, then everything lights up.
    let res = server
        .post("/api/wallet/connect")
        .json(&json!({"address": WALLET}))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["address"], WALLET);
    assert_eq!(body["data"]["network"], "Sepolia Testnet");

    let res = server.get("/api/wallet/balance").await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["data"]["currency"], "ETH");

    let res = server.post("/api/wallet/switch-network").await;
    res.assert_status_ok();

    let res = server.post("/api/wallet/disconnect").await;
    res.assert_status_ok();
    let res = server.get("/api/wallet/address").await;
    res.assert_status_not_found();
}

#[tokio::test]
async fn bad_connect_addresses_are_rejected() {
    let server = server();

    let res = server.post("/api/wallet/connect").json(&json!({})).await;
    res.assert_status_bad_request();

    let res = server
        .post("/api/wallet/connect")
        .json(&json!({"address": "0x123"}))
        .await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "Invalid Ethereum address format");
}
