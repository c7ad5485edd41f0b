// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON body extractor with structured rejections.
//!
//! Same as [`axum::Json`], except a missing, malformed or mistyped body is
//! rejected with an [`ApiError`] body instead of axum's plain-text message.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, StatusCode},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let ApiJson(payload) = ApiJson::<Payload>::from_request(json_request(r#"{"name":"oats"}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.name, "oats");
    }

    #[tokio::test]
    async fn wrong_shape_is_invalid_request() {
        let err = ApiJson::<Payload>::from_request(json_request(r#"{"name":5}"#), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code, "invalid_request");
    }

    #[tokio::test]
    async fn missing_content_type_is_invalid_request() {
        let request = Request::builder().body(Body::from(r#"{"name":"oats"}"#)).unwrap();
        let err = ApiJson::<Payload>::from_request(request, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.error_code, "invalid_request");
    }
}
