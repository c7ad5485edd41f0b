// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    achievements::{AchievementId, AchievementMeta},
    error::ErrorBody,
    identity::resolve_identity,
    models::{ActivityEntry, FoodEntry, Goals},
    state::AppState,
};

pub mod achievements;
pub mod data;
pub mod health;
pub mod json;
pub mod wallet;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/data", get(data::get_data).put(data::save_data))
        .route("/achievements", get(achievements::list_achievements))
        .route("/achievements/mint", post(achievements::mint_achievement))
        .route("/wallet/link", post(wallet::link_wallet))
        .route("/wallet", delete(wallet::disconnect_wallet))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        data::get_data,
        data::save_data,
        achievements::list_achievements,
        achievements::mint_achievement,
        wallet::link_wallet,
        wallet::disconnect_wallet,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            data::UserDataResponse,
            data::SaveDataRequest,
            data::SaveDataResponse,
            achievements::MintAchievementRequest,
            achievements::MintAchievementResponse,
            wallet::LinkWalletRequest,
            wallet::LinkWalletResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            AchievementId,
            AchievementMeta,
            FoodEntry,
            ActivityEntry,
            Goals,
            ErrorBody
        )
    ),
    tags(
        (name = "Data", description = "Diet and activity logs with derived achievements"),
        (name = "Achievements", description = "Achievement catalog and minting"),
        (name = "Wallet", description = "Signature-verified wallet linking"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
