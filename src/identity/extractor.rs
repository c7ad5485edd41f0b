// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the resolved anonymous identity.
//!
//! ```rust,ignore
//! async fn my_handler(Identity(identity): Identity) -> impl IntoResponse {
//!     // identity is AnonymousIdentity
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AnonymousIdentity, ResolvedIdentity};
use crate::error::ApiError;

/// Extractor for the caller's anonymous identity.
///
/// Requires [`resolve_identity`](super::resolve_identity) to run first; a
/// route mounted without it fails with 500 instead of guessing an identity.
pub struct Identity(pub AnonymousIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedIdentity>()
            .map(|resolved| Identity(resolved.identity.clone()))
            .ok_or_else(|| ApiError::internal("Identity middleware is not installed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn extracts_resolved_identity() {
        let identity = AnonymousIdentity::parse(&"A".repeat(43)).unwrap();
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(ResolvedIdentity {
            identity: identity.clone(),
            issued: false,
        });

        let Identity(extracted) = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, identity);
    }

    #[tokio::test]
    async fn missing_middleware_is_an_internal_error() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = Identity::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
