// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Anonymous identity resolution middleware.
//!
//! Every `/api` request passes through [`resolve_identity`]:
//!
//! 1. A well-formed identity cookie is reused as-is.
//! 2. Otherwise a fresh identity is generated and a single `Set-Cookie`
//!    header is added to the response.
//!
//! Either way the identity is placed in the request extensions for the
//! [`Identity`](super::Identity) extractor.

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::AnonymousIdentity;
use crate::{error::ApiError, state::AppState};

/// Name of the identity cookie.
pub const IDENTITY_COOKIE: &str = "fitrelay_id";

/// Cookie lifetime: one year.
pub const IDENTITY_COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Identity attached to a request by [`resolve_identity`].
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub identity: AnonymousIdentity,
    /// Whether this request minted the identity.
    pub issued: bool,
}

/// Find a well-formed identity cookie among the request's `Cookie` headers.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<AnonymousIdentity> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == IDENTITY_COOKIE)
        .find_map(|(_, value)| AnonymousIdentity::parse(value.trim()))
}

/// `Set-Cookie` value for a newly issued identity.
///
/// `HttpOnly` keeps the token away from page scripts and `SameSite=Lax`
/// limits it to same-site requests.
pub fn identity_cookie(identity: &AnonymousIdentity, secure: bool) -> String {
    let mut cookie = format!(
        "{IDENTITY_COOKIE}={}; Path=/; Max-Age={IDENTITY_COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax",
        identity.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Attach an anonymous identity to the request, issuing one when absent.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = match identity_from_headers(request.headers()) {
        Some(identity) => ResolvedIdentity {
            identity,
            issued: false,
        },
        None => match AnonymousIdentity::generate(&state.rng) {
            Ok(identity) => {
                debug!(identity = %identity.fingerprint(), "Issued anonymous identity");
                ResolvedIdentity {
                    identity,
                    issued: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to issue anonymous identity");
                return ApiError::internal("Could not issue an identity").into_response();
            }
        },
    };

    let set_cookie = resolved
        .issued
        .then(|| identity_cookie(&resolved.identity, state.cookie_secure));

    request.extensions_mut().insert(resolved);
    let mut response = next.run(request).await;

    if let Some(cookie) = set_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Identity cookie is not a valid header value"),
        }
    }

    response
}
