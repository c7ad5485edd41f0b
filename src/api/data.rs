// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    achievements::{refresh, AchievementId, AchievementMeta, DerivedView, CATALOG},
    api::json::ApiJson,
    audit_log,
    error::{ApiError, ErrorBody},
    identity::Identity,
    models::{ActivityLog, DietLog, Goals},
    state::AppState,
    storage::{AuditEvent, AuditEventType, UserPatch, UserRecord},
};

/// Everything the client needs to render its state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDataResponse {
    /// Date key → food entries.
    #[schema(value_type = Object)]
    pub diet: DietLog,
    /// Date key → activity sessions.
    #[schema(value_type = Object)]
    pub activity: ActivityLog,
    pub goals: Option<Goals>,
    pub goal_story: String,
    pub wallet_address: Option<String>,
    pub achievements_earned: Vec<AchievementId>,
    /// Always a subset of `achievementsEarned`.
    pub achievements_minted: Vec<AchievementId>,
    pub achievements_meta: Vec<AchievementMeta>,
}

impl UserDataResponse {
    fn new(record: Option<UserRecord>, view: DerivedView) -> Self {
        let record = record.unwrap_or_else(|| UserRecord::new(chrono::Utc::now()));
        Self {
            diet: record.diet,
            activity: record.activity,
            goals: record.goals,
            goal_story: record.goal_story,
            wallet_address: record.wallet_address,
            achievements_earned: view.earned.into_iter().collect(),
            achievements_minted: view.minted.into_iter().collect(),
            achievements_meta: CATALOG.to_vec(),
        }
    }
}

/// Client state to persist. Missing fields are stored as empty.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveDataRequest {
    #[schema(value_type = Object)]
    pub diet: DietLog,
    #[schema(value_type = Object)]
    pub activity: ActivityLog,
    pub goals: Option<Goals>,
    pub goal_story: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveDataResponse {
    pub ok: bool,
}

#[utoipa::path(
    get,
    path = "/api/data",
    tag = "Data",
    responses(
        (status = 200, body = UserDataResponse),
        (status = 502, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn get_data(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<Json<UserDataResponse>, ApiError> {
    let _guard = state.locks.acquire(&identity).await;
    let (record, view) = refresh(state.store.as_ref(), &identity)?;
    Ok(Json(UserDataResponse::new(record, view)))
}

#[utoipa::path(
    put,
    path = "/api/data",
    request_body = SaveDataRequest,
    tag = "Data",
    responses(
        (status = 200, body = SaveDataResponse),
        (status = 400, description = "Body is not valid JSON for this shape", body = ErrorBody),
        (status = 502, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn save_data(
    State(state): State<AppState>,
    Identity(identity): Identity,
    ApiJson(request): ApiJson<SaveDataRequest>,
) -> Result<Json<SaveDataResponse>, ApiError> {
    let _guard = state.locks.acquire(&identity).await;

    let days = json!({
        "diet": request.diet.len(),
        "activity": request.activity.len(),
    });
    state.store.upsert(
        &identity,
        UserPatch {
            diet: Some(request.diet),
            activity: Some(request.activity),
            goals: Some(request.goals),
            goal_story: Some(request.goal_story),
            ..Default::default()
        },
    )?;

    debug!(identity = %identity.fingerprint(), "Saved user data");
    audit_log!(
        state.store,
        AuditEvent::new(AuditEventType::DataSaved)
            .with_identity(&identity)
            .with_details(days)
    );

    Ok(Json(SaveDataResponse { ok: true }))
}
