//! Ticket endpoints: organizer mint/check-in, wallet purchase/check-in,
//! and the read paths (single ticket, by owner, stats).
//!
//! Organizer flows surface chain failures as errors; the wallet flows
//! degrade instead (purchase falls back to a local record, check-in returns
//! a structured `success: false` body) so the user-facing flow always
//! completes.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ticketchain_core::{
    MintTicketRequest, PurchaseOutcome, PurchaseRecord, TicketDetails, TicketError, TokenId,
};

// ============================================================================
// Organizer mint
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MintBody {
    recipient_address: Option<String>,
    event_name: Option<String>,
    event_date: Option<String>,
    event_location: Option<String>,
    #[serde(rename = "preEventMetadataURI")]
    pre_event_metadata_uri: Option<String>,
    original_price: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MintData {
    #[serde(rename = "tokenId")]
    token_id: TokenId,
    recipient: String,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "blockNumber")]
    block_number: u64,
    #[serde(rename = "gasUsed")]
    gas_used: u64,
    #[serde(rename = "eventName")]
    event_name: String,
    #[serde(rename = "eventDate")]
    event_date: DateTime<Utc>,
    #[serde(rename = "eventLocation")]
    event_location: String,
    status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MintResponse {
    success: bool,
    message: &'static str,
    data: MintData,
}

/// POST /api/tickets/mint
pub(crate) async fn mint(
    State(state): State<AppState>,
    Json(body): Json<MintBody>,
) -> Result<(StatusCode, Json<MintResponse>), AppError> {
    let (
        Some(recipient_address),
        Some(event_name),
        Some(event_date),
        Some(event_location),
        Some(pre_metadata_uri),
        Some(original_price),
    ) = (
        body.recipient_address,
        body.event_name,
        body.event_date,
        body.event_location,
        body.pre_event_metadata_uri,
        body.original_price,
    )
    else {
        return Err(AppError::missing_fields(vec![
            "recipientAddress",
            "eventName",
            "eventDate",
            "eventLocation",
            "preEventMetadataURI",
            "originalPrice",
        ]));
    };

    let minted = state
        .manager
        .mint_ticket(MintTicketRequest {
            recipient_address,
            event_name,
            event_date,
            event_location,
            pre_metadata_uri,
            original_price,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MintResponse {
            success: true,
            message: "Ticket minted successfully",
            data: MintData {
                token_id: minted.receipt.token_id,
                recipient: minted.ticket.owner_address.to_string(),
                transaction_hash: minted.receipt.tx_hash,
                block_number: minted.receipt.block_number,
                gas_used: minted.receipt.gas_used,
                event_name: minted.ticket.event_name,
                event_date: minted.ticket.event_date,
                event_location: minted.ticket.event_location,
                status: "minted",
            },
        }),
    ))
}

// ============================================================================
// Organizer check-in
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct CheckInBody {
    #[serde(rename = "tokenId")]
    token_id: Option<serde_json::Value>,
    #[serde(rename = "postEventMetadataURI")]
    post_event_metadata_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckInData {
    #[serde(rename = "tokenId")]
    token_id: TokenId,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "blockNumber")]
    block_number: u64,
    #[serde(rename = "gasUsed")]
    gas_used: u64,
    status: &'static str,
    #[serde(rename = "checkedInAt")]
    checked_in_at: Option<DateTime<Utc>>,
    #[serde(rename = "newMetadataURI")]
    new_metadata_uri: String,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    success: bool,
    message: &'static str,
    data: CheckInData,
}

/// POST /api/tickets/checkIn
pub(crate) async fn check_in(
    State(state): State<AppState>,
    Json(body): Json<CheckInBody>,
) -> Result<Json<CheckInResponse>, AppError> {
    let (Some(token_value), Some(post_uri)) = (body.token_id, body.post_event_metadata_uri) else {
        return Err(AppError::missing_fields(vec![
            "tokenId",
            "postEventMetadataURI",
        ]));
    };
    let token_id = serde_json::from_value::<TokenId>(token_value)
        .map_err(|_| AppError::bad_request("Invalid token ID"))?;

    let checked = state.manager.check_in_by_token(&token_id, &post_uri).await?;

    Ok(Json(CheckInResponse {
        success: true,
        message: "Ticket checked in successfully",
        data: CheckInData {
            token_id: checked.receipt.token_id,
            transaction_hash: checked.receipt.tx_hash,
            block_number: checked.receipt.block_number,
            gas_used: checked.receipt.gas_used,
            status: "checked_in",
            checked_in_at: checked.ticket.checked_in_at,
            new_metadata_uri: post_uri,
        },
    }))
}

// ============================================================================
// Reads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    success: bool,
    data: TicketDetails,
}

/// GET /api/tickets/:tokenId
pub(crate) async fn get_ticket(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> Result<Json<TicketResponse>, AppError> {
    let token_id =
        TokenId::from_str(&token_id).map_err(|_| AppError::bad_request("Invalid token ID"))?;
    let details = state.manager.ticket(&token_id).await?;
    Ok(Json(TicketResponse {
        success: true,
        data: details,
    }))
}

#[derive(Debug, Serialize)]
struct OwnerData {
    owner: String,
    tickets: Vec<ticketchain_core::Ticket>,
    count: usize,
}

#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    success: bool,
    data: OwnerData,
}

/// GET /api/tickets/owner/:address
pub(crate) async fn get_tickets_by_owner(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<OwnerResponse>, AppError> {
    let tickets = state.manager.tickets_by_owner(&address).await?;
    Ok(Json(OwnerResponse {
        success: true,
        data: OwnerData {
            owner: address,
            count: tickets.len(),
            tickets,
        },
    }))
}

#[derive(Debug, Serialize)]
struct BlockchainStats {
    #[serde(rename = "totalSupply")]
    total_supply: Option<u64>,
}

#[derive(Debug, Serialize)]
struct StatsData {
    database: ticketchain_core::TicketCounts,
    blockchain: BlockchainStats,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    success: bool,
    data: StatsData,
}

/// GET /api/tickets/stats
pub(crate) async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.manager.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        data: StatsData {
            database: stats.database,
            blockchain: BlockchainStats {
                total_supply: stats.total_supply,
            },
        },
    }))
}

// ============================================================================
// Wallet purchase
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseBody {
    event_id: Option<String>,
    user_wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    success: bool,
    message: &'static str,
    data: PurchaseOutcome,
}

/// POST /api/tickets/purchase
pub(crate) async fn purchase(
    State(state): State<AppState>,
    Json(body): Json<PurchaseBody>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let (Some(event_id), Some(wallet)) = (body.event_id, body.user_wallet_address) else {
        return Err(AppError::missing_fields(vec![
            "eventId",
            "userWalletAddress",
        ]));
    };

    let outcome = state
        .manager
        .purchase(&event_id, &wallet)
        .await
        .map_err(|err| match err {
            // An unknown event is a caller mistake here, not a missing
            // resource: same 400 as sold-out and duplicate.
            TicketError::NotFound(message) => AppError::bad_request(message),
            other => AppError::from(other),
        })?;

    Ok(Json(PurchaseResponse {
        success: true,
        message: "Ticket purchased successfully",
        data: outcome,
    }))
}

// ============================================================================
// Wallet ticket list
// ============================================================================

#[derive(Debug, Serialize)]
struct UserTicketEvent {
    id: String,
    name: String,
    date: DateTime<Utc>,
    location: String,
}

#[derive(Debug, Serialize)]
struct UserTicket {
    #[serde(rename = "tokenId")]
    token_id: TokenId,
    #[serde(rename = "eventId")]
    event_id: String,
    event: UserTicketEvent,
    status: ticketchain_core::PurchaseStatus,
    #[serde(rename = "purchaseDate")]
    purchase_date: DateTime<Utc>,
    #[serde(rename = "nftTransactionHash")]
    nft_transaction_hash: String,
    #[serde(rename = "nftMintSuccess")]
    nft_mint_success: bool,
    #[serde(rename = "nftBlockNumber")]
    nft_block_number: Option<u64>,
}

impl From<PurchaseRecord> for UserTicket {
    fn from(record: PurchaseRecord) -> Self {
        Self {
            token_id: record.token_id,
            event: UserTicketEvent {
                id: record.event_id.clone(),
                name: record.event_name,
                date: record.event_date,
                location: record.event_location,
            },
            event_id: record.event_id,
            status: record.status,
            purchase_date: record.purchased_at,
            nft_transaction_hash: record.tx_hash,
            nft_mint_success: record.mint_success,
            nft_block_number: record.block_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserTicketsResponse {
    success: bool,
    data: Vec<UserTicket>,
}

/// GET /api/tickets/user/:walletAddress
pub(crate) async fn get_user_tickets(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<Json<UserTicketsResponse>, AppError> {
    let tickets = state.manager.user_tickets(&wallet).await?;
    Ok(Json(UserTicketsResponse {
        success: true,
        data: tickets.into_iter().map(UserTicket::from).collect(),
    }))
}

// ============================================================================
// Wallet check-in
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WalletCheckInBody {
    user_wallet_address: Option<String>,
    event_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletCheckInResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "userName")]
    user_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "eventStatus")]
    event_status: Option<ticketchain_core::PurchaseStatus>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "tokenId")]
    token_id: Option<TokenId>,
}

/// POST /api/tickets/check-in
///
/// Structured-result endpoint: lifecycle rejections come back as HTTP 200
/// with `success: false` and a user-facing message, so a scanner UI can
/// display them directly. Only malformed input and internal failures use
/// error status codes.
pub(crate) async fn wallet_check_in(
    State(state): State<AppState>,
    Json(body): Json<WalletCheckInBody>,
) -> Result<(StatusCode, Json<WalletCheckInResponse>), AppError> {
    let (Some(wallet), Some(event_id)) = (body.user_wallet_address, body.event_id) else {
        return Err(AppError::missing_fields(vec![
            "userWalletAddress",
            "eventId",
        ]));
    };

    let response = match state.manager.check_in(&wallet, &event_id).await {
        Ok(outcome) => WalletCheckInResponse {
            success: true,
            message: "Check-in successful! Welcome to the event.".to_string(),
            user_name: Some("Attendee"),
            event_status: Some(outcome.status),
            token_id: Some(outcome.token_id),
        },
        Err(TicketError::AlreadyUsed) => rejection("This ticket has already been used."),
        Err(err @ (TicketError::NotFound(_) | TicketError::Burned)) => {
            rejection(err.to_string())
        }
        Err(TicketError::Validation(message)) => {
            return Err(AppError::bad_request(message));
        }
        Err(err) => {
            tracing::error!(error = %err, "wallet check-in failed");
            return Err(AppError::internal(
                "An internal error occurred. Please try again.",
            ));
        }
    };

    Ok((StatusCode::OK, Json(response)))
}

fn rejection(message: impl Into<String>) -> WalletCheckInResponse {
    WalletCheckInResponse {
        success: false,
        message: message.into(),
        user_name: None,
        event_status: None,
        token_id: None,
    }
}
