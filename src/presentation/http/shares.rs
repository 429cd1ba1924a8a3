use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::links::LinkDto;
use crate::application::use_cases::links::create_link::{
    CreateLink, CreateLinkInput, CreateOutcome,
};
use crate::application::use_cases::links::delete_link::DeleteLink;
use crate::application::use_cases::links::list_links::ListLinks;
use crate::application::use_cases::links::resolve_link::{ResolveLink, ResolveOutcome};
use crate::application::use_cases::links::trigger_entity::{TriggerEntity, TriggerOutcome};
use crate::application::use_cases::links::update_link::{
    UpdateLink, UpdateLinkInput, UpdateOutcome,
};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::links::{AccessMode, LinkKind};
use crate::presentation::http::auth::{Bearer, validate_bearer};
use crate::presentation::http::entities::HubEntityResponse;
use crate::presentation::http::error::ApiError;

fn share_url(cfg: &Config, id: &str) -> String {
    let base = cfg
        .frontend_url
        .clone()
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{}/share/{}", base.trim_end_matches('/'), id)
}

fn parse_kind(s: &str) -> Result<LinkKind, ApiError> {
    LinkKind::parse(s).ok_or_else(|| {
        ApiError::validation("invalid type, must be 'permanent', 'counter' or 'time'")
    })
}

fn parse_mode(s: &str) -> Result<AccessMode, ApiError> {
    AccessMode::parse(s).ok_or_else(|| {
        ApiError::validation("invalid access_mode, must be 'readonly' or 'triggerable'")
    })
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShareRequest {
    pub entity_ids: Vec<String>,
    pub r#type: String,
    pub access_mode: Option<String>,
    pub max_access: Option<i64>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShareRequest {
    pub entity_ids: Option<Vec<String>>,
    pub r#type: Option<String>,
    pub access_mode: Option<String>,
    pub max_access: Option<i64>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Empty string clears the password; absent leaves it unchanged.
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShareLinkResponse {
    pub id: String,
    pub url: String,
    pub entity_ids: Vec<String>,
    pub r#type: String,
    pub access_mode: String,
    pub access_count: i64,
    pub max_access: Option<i64>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub active: bool,
    pub has_password: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ShareLinkResponse {
    fn from_dto(cfg: &Config, dto: LinkDto) -> Self {
        let url = share_url(cfg, &dto.id);
        ShareLinkResponse {
            id: dto.id,
            url,
            entity_ids: dto.entity_ids,
            r#type: dto.kind,
            access_mode: dto.access_mode,
            access_count: dto.access_count,
            max_access: dto.max_access,
            expires_at: dto.expires_at,
            active: dto.active,
            has_password: dto.has_password,
            created_at: dto.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveShareResponse {
    pub access_mode: String,
    pub entity_ids: Vec<String>,
    pub entities: Vec<HubEntityResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TriggerRequest {
    pub action: String,
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerResponse {
    pub message: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/shares", post(create_share).get(list_shares))
        .route(
            "/shares/:id",
            get(resolve_share).put(update_share).delete(delete_share),
        )
        .route("/shares/:id/trigger/:entity_id", post(trigger_entity))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/shares", tag = "Sharing",
    request_body = CreateShareRequest,
    responses((status = 201, description = "Share link created", body = ShareLinkResponse)))]
pub async fn create_share(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<CreateShareRequest>,
) -> Result<(axum::http::StatusCode, Json<ShareLinkResponse>), ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let kind = parse_kind(&req.r#type)?;
    let access_mode = parse_mode(req.access_mode.as_deref().unwrap_or("readonly"))?;
    let repo = ctx.link_repo();
    let uc = CreateLink {
        repo: repo.as_ref(),
    };
    let input = CreateLinkInput {
        entity_ids: req.entity_ids,
        kind,
        access_mode,
        max_access: req.max_access,
        expires_at: req.expires_at,
        password: req.password,
    };
    match uc.execute(user_id, input).await? {
        CreateOutcome::Created(link) => Ok((
            axum::http::StatusCode::CREATED,
            Json(ShareLinkResponse::from_dto(&ctx.cfg, link.into())),
        )),
        CreateOutcome::Invalid(msg) => Err(ApiError::validation(msg)),
    }
}

#[utoipa::path(get, path = "/api/shares", tag = "Sharing",
    responses((status = 200, body = [ShareLinkResponse])))]
pub async fn list_shares(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<ShareLinkResponse>>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.link_repo();
    let uc = ListLinks {
        repo: repo.as_ref(),
    };
    let rows = uc.execute(user_id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|dto| ShareLinkResponse::from_dto(&ctx.cfg, dto))
            .collect(),
    ))
}

#[utoipa::path(put, path = "/api/shares/{id}", tag = "Sharing",
    params(("id" = String, Path, description = "Share link ID")),
    request_body = UpdateShareRequest,
    responses((status = 200, body = ShareLinkResponse)))]
pub async fn update_share(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<String>,
    Json(req): Json<UpdateShareRequest>,
) -> Result<Json<ShareLinkResponse>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let kind = req.r#type.as_deref().map(parse_kind).transpose()?;
    let access_mode = req.access_mode.as_deref().map(parse_mode).transpose()?;
    let repo = ctx.link_repo();
    let uc = UpdateLink {
        repo: repo.as_ref(),
    };
    let input = UpdateLinkInput {
        entity_ids: req.entity_ids,
        kind,
        access_mode,
        max_access: req.max_access,
        expires_at: req.expires_at,
        password: req.password,
    };
    match uc.execute(user_id, &id, input).await? {
        UpdateOutcome::Updated(link) => {
            Ok(Json(ShareLinkResponse::from_dto(&ctx.cfg, link.into())))
        }
        UpdateOutcome::NotFound => Err(ApiError::not_found("share link not found")),
        UpdateOutcome::Inactive => Err(ApiError::forbidden(
            "share link is no longer active; delete and recreate it",
        )),
        UpdateOutcome::Invalid(msg) => Err(ApiError::validation(msg)),
    }
}

#[utoipa::path(delete, path = "/api/shares/{id}", tag = "Sharing",
    params(("id" = String, Path, description = "Share link ID")),
    responses((status = 204, description = "Share link deleted")))]
pub async fn delete_share(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.link_repo();
    let uc = DeleteLink {
        repo: repo.as_ref(),
    };
    if uc.execute(user_id, &id).await? {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("share link not found"))
    }
}

#[utoipa::path(get, path = "/api/shares/{id}", tag = "Sharing",
    params(
        ("id" = String, Path, description = "Share link ID"),
        ("password" = Option<String>, Query, description = "Link password, when set")
    ),
    security(()),
    responses((status = 200, body = ResolveShareResponse)))]
pub async fn resolve_share(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(q): Query<ResolveQuery>,
) -> Result<Json<ResolveShareResponse>, ApiError> {
    let links = ctx.link_repo();
    let users = ctx.user_repo();
    let hub = ctx.hub_port();
    let uc = ResolveLink {
        links: links.as_ref(),
        users: users.as_ref(),
        hub: hub.as_ref(),
    };
    match uc
        .execute(&id, q.password.as_deref(), chrono::Utc::now())
        .await?
    {
        ResolveOutcome::Denied(reason) => Err(reason.into()),
        ResolveOutcome::Granted {
            access_mode,
            entity_ids,
            entities,
        } => Ok(Json(ResolveShareResponse {
            access_mode: access_mode.as_str().to_string(),
            entity_ids,
            entities: entities.into_iter().map(Into::into).collect(),
        })),
    }
}

#[utoipa::path(post, path = "/api/shares/{id}/trigger/{entity_id}", tag = "Sharing",
    params(
        ("id" = String, Path, description = "Share link ID"),
        ("entity_id" = String, Path, description = "Target entity")
    ),
    security(()),
    request_body = TriggerRequest,
    responses((status = 200, body = TriggerResponse)))]
pub async fn trigger_entity(
    State(ctx): State<AppContext>,
    Path((id, entity_id)): Path<(String, String)>,
    Json(req): Json<TriggerRequest>,
) -> Result<Json<TriggerResponse>, ApiError> {
    if req.action.trim().is_empty() {
        return Err(ApiError::validation("action is required"));
    }
    let links = ctx.link_repo();
    let users = ctx.user_repo();
    let hub = ctx.hub_port();
    let uc = TriggerEntity {
        links: links.as_ref(),
        users: users.as_ref(),
        hub: hub.as_ref(),
    };
    match uc
        .execute(
            &id,
            &entity_id,
            req.action.trim(),
            req.data,
            req.password.as_deref(),
            chrono::Utc::now(),
        )
        .await?
    {
        TriggerOutcome::Dispatched => Ok(Json(TriggerResponse {
            message: "entity triggered".into(),
        })),
        TriggerOutcome::Denied(reason) => Err(reason.into()),
        TriggerOutcome::BadEntityId => Err(ApiError::validation("invalid entity id format")),
        TriggerOutcome::HubNotConfigured => {
            tracing::warn!(link = %id, "trigger on a share whose owner has no hub");
            Err(ApiError::upstream())
        }
        TriggerOutcome::UpstreamFailed(e) => {
            tracing::warn!(link = %id, entity = %entity_id, error = %e, "hub dispatch failed");
            Err(ApiError::upstream())
        }
    }
}
