// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the external mint service.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{MintFuture, MintReceipt, Minter, MinterError};
use crate::achievements::AchievementMeta;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintRequest<'a> {
    wallet_address: &'a str,
    achievement_id: &'a str,
    name: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintResponse {
    #[serde(alias = "signature", alias = "txId")]
    transaction_reference: String,
}

/// Mints by POSTing JSON to a configured endpoint.
#[derive(Clone)]
pub struct HttpMinter {
    endpoint: Url,
    token: Option<String>,
    http: Client,
}

impl fmt::Debug for HttpMinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMinter")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpMinter {
    pub fn new(endpoint: Url, token: Option<String>, timeout: Duration) -> Result<Self, MinterError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MinterError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            token,
            http,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(
        &self,
        wallet_address: &str,
        achievement: &AchievementMeta,
    ) -> Result<MintReceipt, MinterError> {
        let body = MintRequest {
            wallet_address,
            achievement_id: achievement.id.as_str(),
            name: achievement.name,
            description: achievement.description,
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MinterError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MinterError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let parsed: MintResponse = response
            .json()
            .await
            .map_err(|e| MinterError::InvalidResponse(e.to_string()))?;

        if parsed.transaction_reference.trim().is_empty() {
            return Err(MinterError::InvalidResponse(
                "response did not include a transaction reference".to_string(),
            ));
        }

        Ok(MintReceipt {
            transaction_reference: parsed.transaction_reference,
        })
    }
}

impl Minter for HttpMinter {
    fn mint<'a>(&'a self, wallet_address: &'a str, achievement: &'a AchievementMeta) -> MintFuture<'a> {
        Box::pin(self.send(wallet_address, achievement))
    }
}
