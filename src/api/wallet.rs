// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    api::json::ApiJson,
    audit_log,
    error::{ApiError, ErrorBody},
    identity::Identity,
    state::AppState,
    storage::{AuditEvent, AuditEventType, UserField, UserPatch},
    wallet::verify_link,
};

/// Proof of control over a wallet key.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkWalletRequest {
    /// Base58 Ed25519 public key.
    pub public_key: String,
    /// Challenge text that was signed.
    pub message: String,
    /// Base58 detached signature over `message`.
    pub signature: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkWalletResponse {
    pub wallet_address: String,
}

#[utoipa::path(
    post,
    path = "/api/wallet/link",
    request_body = LinkWalletRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = LinkWalletResponse),
        (status = 400, description = "Missing or malformed input", body = ErrorBody),
        (status = 401, description = "Signature rejected", body = ErrorBody)
    )
)]
pub async fn link_wallet(
    State(state): State<AppState>,
    Identity(identity): Identity,
    ApiJson(request): ApiJson<LinkWalletRequest>,
) -> Result<Json<LinkWalletResponse>, ApiError> {
    if let Err(e) = verify_link(&request.public_key, &request.message, &request.signature) {
        warn!(
            identity = %identity.fingerprint(),
            error_code = e.error_code(),
            "Wallet link rejected"
        );
        audit_log!(
            state.store,
            AuditEvent::new(AuditEventType::WalletLinkRejected)
                .with_identity(&identity)
                .failed(e.error_code())
        );
        return Err(e.into());
    }

    let _guard = state.locks.acquire(&identity).await;
    state.store.upsert(
        &identity,
        UserPatch {
            wallet_address: Some(request.public_key.clone()),
            ..Default::default()
        },
    )?;

    info!(
        identity = %identity.fingerprint(),
        wallet = %request.public_key,
        "Wallet linked"
    );
    audit_log!(
        state.store,
        AuditEvent::new(AuditEventType::WalletLinked)
            .with_identity(&identity)
            .with_resource("wallet", request.public_key.as_str())
    );

    Ok(Json(LinkWalletResponse {
        wallet_address: request.public_key,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/wallet",
    tag = "Wallet",
    responses(
        (status = 204, description = "Wallet unlinked"),
        (status = 502, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn disconnect_wallet(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<StatusCode, ApiError> {
    let _guard = state.locks.acquire(&identity).await;
    state.store.remove_field(&identity, UserField::WalletAddress)?;

    info!(identity = %identity.fingerprint(), "Wallet unlinked");
    audit_log!(
        state.store,
        AuditEvent::new(AuditEventType::WalletUnlinked).with_identity(&identity)
    );

    Ok(StatusCode::NO_CONTENT)
}
