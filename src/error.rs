// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::minting::MintError;
use crate::storage::StoreError;
use crate::wallet::WalletLinkError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_code: &'static str,
    pub message: String,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message, safe to show.
    pub error: String,
    /// Stable machine-readable code.
    pub error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Request body that is missing, not JSON, or the wrong shape.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "upstream_error", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// Replace the error code, keeping status and message.
    pub fn with_code(mut self, error_code: &'static str) -> Self {
        self.error_code = error_code;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code.to_string(),
        });
        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        debug!(status = %rejection.status(), error = %message, "Rejected request body");
        ApiError::invalid_request(message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        warn!(error = %err, "Store operation failed");
        match err {
            StoreError::Closed => ApiError::service_unavailable("Storage is not available")
                .with_code("storage_unavailable"),
            _ => ApiError::bad_gateway("Storage request failed").with_code("storage_error"),
        }
    }
}

impl From<WalletLinkError> for ApiError {
    fn from(err: WalletLinkError) -> Self {
        let status = match err {
            WalletLinkError::MissingField(_)
            | WalletLinkError::InvalidPublicKey
            | WalletLinkError::MalformedSignature => StatusCode::BAD_REQUEST,
            WalletLinkError::InvalidSignatureLength { .. } | WalletLinkError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
        };
        ApiError::new(status, err.error_code(), err.to_string())
    }
}

impl From<MintError> for ApiError {
    fn from(err: MintError) -> Self {
        let code = err.error_code();
        match err {
            MintError::WalletNotLinked | MintError::NotEarned(_) => {
                ApiError::new(StatusCode::FORBIDDEN, code, err.to_string())
            }
            MintError::UnknownAchievement(_) => {
                ApiError::new(StatusCode::NOT_FOUND, code, err.to_string())
            }
            MintError::AlreadyMinted(_) => ApiError::new(StatusCode::CONFLICT, code, err.to_string()),
            MintError::MintingUnavailable => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, code, err.to_string())
            }
            MintError::Upstream(_) => ApiError::bad_gateway("Mint service request failed").with_code(code),
            MintError::Store(e) => e.into(),
        }
    }
}
