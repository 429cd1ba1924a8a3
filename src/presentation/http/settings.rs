use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::use_cases::settings::change_password::{
    ChangePassword, ChangePasswordOutcome,
};
use crate::application::use_cases::settings::configure_hub::{ConfigureHub, ConfigureHubOutcome};
use crate::application::use_cases::settings::get_settings::GetSettings;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, validate_bearer};
use crate::presentation::http::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    pub email: String,
    pub name: String,
    pub has_hub_config: bool,
    pub hub_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfigureHubRequest {
    pub hub_url: String,
    pub hub_token: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings/password", put(change_password))
        .route("/settings/hub", put(configure_hub))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/settings", tag = "Settings", responses((status = 200, body = SettingsResponse)))]
pub async fn get_settings(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<SettingsResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.user_repo();
    let uc = GetSettings {
        repo: repo.as_ref(),
    };
    let dto = uc
        .execute(user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("unknown user"))?;
    Ok(Json(SettingsResponse {
        email: dto.email,
        name: dto.name,
        has_hub_config: dto.has_hub_config,
        hub_url: dto.hub_base_url,
    }))
}

#[utoipa::path(put, path = "/api/settings/password", tag = "Settings",
    request_body = ChangePasswordRequest, responses((status = 204)))]
pub async fn change_password(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<axum::http::StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    if req.new_password.len() < 8 {
        return Err(ApiError::validation(
            "password must be at least 8 characters",
        ));
    }
    let repo = ctx.user_repo();
    let uc = ChangePassword {
        repo: repo.as_ref(),
    };
    match uc
        .execute(user_id, &req.current_password, &req.new_password)
        .await?
    {
        ChangePasswordOutcome::Changed => Ok(axum::http::StatusCode::NO_CONTENT),
        ChangePasswordOutcome::WrongCurrent => {
            Err(ApiError::unauthorized("current password is incorrect"))
        }
        ChangePasswordOutcome::NotFound => Err(ApiError::unauthorized("unknown user")),
    }
}

#[utoipa::path(put, path = "/api/settings/hub", tag = "Settings",
    request_body = ConfigureHubRequest, responses((status = 204)))]
pub async fn configure_hub(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<ConfigureHubRequest>,
) -> Result<axum::http::StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    if req.hub_url.trim().is_empty() || req.hub_token.trim().is_empty() {
        return Err(ApiError::validation("hub_url and hub_token are required"));
    }
    let users = ctx.user_repo();
    let hub = ctx.hub_port();
    let uc = ConfigureHub {
        users: users.as_ref(),
        hub: hub.as_ref(),
    };
    match uc.execute(user_id, &req.hub_url, &req.hub_token).await? {
        ConfigureHubOutcome::Saved => Ok(axum::http::StatusCode::NO_CONTENT),
        ConfigureHubOutcome::Rejected(msg) => Err(ApiError::validation(msg)),
        ConfigureHubOutcome::NotFound => Err(ApiError::unauthorized("unknown user")),
    }
}
