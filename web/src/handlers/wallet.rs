//! Wallet session endpoints.

use crate::error::AppError;
use crate::state::AppState;
use crate::wallet::ConnectionStatus;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use ticketchain_core::WalletAddress;

const NETWORK: &str = "Sepolia Testnet";

#[derive(Debug, Deserialize)]
pub(crate) struct ConnectBody {
    address: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConnectData {
    address: String,
    network: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    success: bool,
    message: &'static str,
    data: ConnectData,
}

/// POST /api/wallet/connect
pub(crate) async fn connect(
    State(state): State<AppState>,
    Json(body): Json<ConnectBody>,
) -> Result<Json<ConnectResponse>, AppError> {
    let Some(address) = body.address else {
        return Err(AppError::missing_fields(vec!["address"]));
    };
    let address = WalletAddress::parse(&address)
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    state.wallet.connect(address.clone()).await;

    Ok(Json(ConnectResponse {
        success: true,
        message: "Wallet connected successfully",
        data: ConnectData {
            address: address.to_string(),
            network: NETWORK,
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    success: bool,
    message: &'static str,
}

/// POST /api/wallet/disconnect
pub(crate) async fn disconnect(State(state): State<AppState>) -> Json<MessageResponse> {
    state.wallet.disconnect().await;
    Json(MessageResponse {
        success: true,
        message: "Wallet disconnected successfully",
    })
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    success: bool,
    data: ConnectionStatus,
}

/// GET /api/wallet/status
pub(crate) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        data: state.wallet.status().await,
    })
}

#[derive(Debug, Serialize)]
struct AddressData {
    address: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    success: bool,
    data: AddressData,
}

/// GET /api/wallet/address
pub(crate) async fn address(
    State(state): State<AppState>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = state
        .wallet
        .address()
        .await
        .ok_or_else(|| AppError::not_found("No wallet connected"))?;
    Ok(Json(AddressResponse {
        success: true,
        data: AddressData {
            address: address.to_string(),
        },
    }))
}

#[derive(Debug, Serialize)]
struct BalanceData {
    balance: String,
    currency: &'static str,
    network: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    success: bool,
    data: BalanceData,
}

/// GET /api/wallet/balance
pub(crate) async fn balance(
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state
        .wallet
        .balance()
        .await
        .ok_or_else(|| AppError::not_found("No wallet connected"))?;
    Ok(Json(BalanceResponse {
        success: true,
        data: BalanceData {
            balance,
            currency: "ETH",
            network: NETWORK,
        },
    }))
}

/// POST /api/wallet/switch-network
pub(crate) async fn switch_network(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.wallet.can_switch_network().await {
        return Err(AppError::bad_request("Failed to switch network"));
    }
    Ok(Json(MessageResponse {
        success: true,
        message: "Switched to Sepolia testnet successfully",
    }))
}
