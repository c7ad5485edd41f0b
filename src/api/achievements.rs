// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    achievements::{AchievementId, AchievementMeta, CATALOG},
    api::json::ApiJson,
    error::{ApiError, ErrorBody},
    identity::Identity,
    minting::MintGate,
    state::AppState,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintAchievementRequest {
    /// Catalog id, e.g. `streak_7`. Required and non-empty.
    pub achievement_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintAchievementResponse {
    pub achievement_id: AchievementId,
    pub transaction_reference: String,
    pub achievements_minted: Vec<AchievementId>,
}

#[utoipa::path(
    get,
    path = "/api/achievements",
    tag = "Achievements",
    responses((status = 200, body = [AchievementMeta]))
)]
pub async fn list_achievements() -> Json<Vec<AchievementMeta>> {
    Json(CATALOG.to_vec())
}

#[utoipa::path(
    post,
    path = "/api/achievements/mint",
    request_body = MintAchievementRequest,
    tag = "Achievements",
    responses(
        (status = 200, body = MintAchievementResponse),
        (status = 400, description = "Missing or empty achievementId", body = ErrorBody),
        (status = 403, description = "Wallet not linked or achievement not earned", body = ErrorBody),
        (status = 404, description = "Unknown achievement", body = ErrorBody),
        (status = 409, description = "Already minted", body = ErrorBody),
        (status = 502, description = "Mint service or storage failure", body = ErrorBody),
        (status = 503, description = "Minting not configured", body = ErrorBody)
    )
)]
pub async fn mint_achievement(
    State(state): State<AppState>,
    Identity(identity): Identity,
    ApiJson(request): ApiJson<MintAchievementRequest>,
) -> Result<Json<MintAchievementResponse>, ApiError> {
    let requested = request.achievement_id.trim();
    if requested.is_empty() {
        return Err(ApiError::invalid_request("achievementId is required"));
    }

    let _guard = state.locks.acquire(&identity).await;

    let outcome = MintGate::new(state.store.as_ref(), state.minter.as_deref())
        .mint(&identity, requested)
        .await?;

    Ok(Json(MintAchievementResponse {
        achievement_id: outcome.achievement_id,
        transaction_reference: outcome.transaction_reference,
        achievements_minted: outcome.achievements_minted.into_iter().collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AnonymousIdentity;
    use crate::minting::fake::FakeMinter;
    use crate::models::{ActivityEntry, ActivityLog};
    use crate::storage::{InMemoryUserStore, UserPatch, UserStore};
    use axum::http::StatusCode;
    use std::sync::Arc;

    fn identity() -> AnonymousIdentity {
        AnonymousIdentity::parse(&"Y".repeat(43)).unwrap()
    }

    fn seeded_store() -> Arc<InMemoryUserStore> {
        let store = Arc::new(InMemoryUserStore::new());
        let mut activity = ActivityLog::new();
        activity.insert(
            "2024-05-01".into(),
            vec![ActivityEntry {
                kind: "bike".into(),
                duration: 40.0,
                intensity: "high".into(),
            }],
        );
        store
            .upsert(
                &identity(),
                UserPatch {
                    activity: Some(activity),
                    wallet_address: Some("wallet-9".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        store
    }

    fn mint_request(id: &str) -> ApiJson<MintAchievementRequest> {
        ApiJson(MintAchievementRequest {
            achievement_id: id.into(),
        })
    }

    #[tokio::test]
    async fn catalog_lists_every_achievement() {
        let Json(catalog) = list_achievements().await;
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog[0].id, AchievementId::FirstFood);
    }

    #[tokio::test]
    async fn mint_then_conflict() {
        let minter = Arc::new(FakeMinter::new());
        let state = AppState::new(seeded_store()).with_minter(minter.clone());

        let Json(minted) = mint_achievement(
            State(state.clone()),
            Identity(identity()),
            mint_request("first_activity"),
        )
        .await
        .unwrap();
        assert_eq!(minted.achievement_id, AchievementId::FirstActivity);
        assert_eq!(minted.achievements_minted, vec![AchievementId::FirstActivity]);

        let err = mint_achievement(State(state), Identity(identity()), mint_request("first_activity"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.error_code, "already_minted");
        assert_eq!(minter.calls(), 1);
    }

    #[tokio::test]
    async fn minting_without_backend_is_unavailable() {
        let state = AppState::new(seeded_store());

        let err = mint_achievement(State(state), Identity(identity()), mint_request("first_activity"))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_achievement_is_not_found() {
        let state = AppState::new(seeded_store()).with_minter(Arc::new(FakeMinter::new()));

        let err = mint_achievement(State(state), Identity(identity()), mint_request("marathon"))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_achievement_id_is_rejected_before_the_gate() {
        let store = seeded_store();
        let minter = Arc::new(FakeMinter::new());
        let state = AppState::new(store.clone()).with_minter(minter.clone());

        let err = mint_achievement(State(state), Identity(identity()), mint_request("  "))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code, "invalid_request");
        assert_eq!(minter.calls(), 0);
    }

    #[test]
    fn achievement_id_is_required() {
        let parsed = serde_json::from_value::<MintAchievementRequest>(serde_json::json!({}));
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn failed_upstream_is_bad_gateway() {
        let state = AppState::new(seeded_store()).with_minter(Arc::new(FakeMinter::failing()));

        let err = mint_achievement(State(state), Identity(identity()), mint_request("first_activity"))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code, "mint_failed");
    }
}
