use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::entity_repository::EntityRow;
use crate::application::ports::hub_port::HubEntity;
use crate::application::use_cases::entities::browse_hub::{BrowseHub, BrowseOutcome};
use crate::application::use_cases::entities::list_tracked::ListTracked;
use crate::application::use_cases::entities::track_entity::{TrackEntity, TrackOutcome};
use crate::application::use_cases::entities::untrack_entity::UntrackEntity;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, validate_bearer};
use crate::presentation::http::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackedEntityResponse {
    pub id: Uuid,
    pub entity_id: String,
    pub state: String,
    #[schema(value_type = Object)]
    pub attributes: serde_json::Value,
    pub last_changed: Option<chrono::DateTime<chrono::Utc>>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<EntityRow> for TrackedEntityResponse {
    fn from(r: EntityRow) -> Self {
        TrackedEntityResponse {
            id: r.id,
            entity_id: r.entity_id,
            state: r.state,
            attributes: r.attributes.into_value(),
            last_changed: r.last_changed,
            last_updated: r.last_updated,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HubEntityResponse {
    pub entity_id: String,
    pub state: String,
    #[schema(value_type = Object)]
    pub attributes: serde_json::Value,
    pub last_changed: Option<chrono::DateTime<chrono::Utc>>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<HubEntity> for HubEntityResponse {
    fn from(e: HubEntity) -> Self {
        HubEntityResponse {
            entity_id: e.entity_id,
            state: e.state,
            attributes: e.attributes.into_value(),
            last_changed: e.last_changed,
            last_updated: e.last_updated,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackEntityRequest {
    pub entity_id: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/entities", get(list_entities).post(track_entity))
        .route("/entities/:id", delete(untrack_entity))
        .route("/hub/entities", get(browse_hub_entities))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/entities", tag = "Entities",
    responses((status = 200, body = [TrackedEntityResponse])))]
pub async fn list_entities(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<TrackedEntityResponse>>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.entity_repo();
    let uc = ListTracked {
        repo: repo.as_ref(),
    };
    let rows = uc.execute(user_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/api/entities", tag = "Entities",
    request_body = TrackEntityRequest,
    responses((status = 201, body = TrackedEntityResponse)))]
pub async fn track_entity(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Json(req): Json<TrackEntityRequest>,
) -> Result<(axum::http::StatusCode, Json<TrackedEntityResponse>), ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let entity_id = req.entity_id.trim();
    if entity_id.is_empty() {
        return Err(ApiError::validation("entity_id is required"));
    }
    let users = ctx.user_repo();
    let entities = ctx.entity_repo();
    let hub = ctx.hub_port();
    let uc = TrackEntity {
        users: users.as_ref(),
        entities: entities.as_ref(),
        hub: hub.as_ref(),
    };
    match uc.execute(user_id, entity_id).await? {
        TrackOutcome::Tracked(row) => Ok((axum::http::StatusCode::CREATED, Json(row.into()))),
        TrackOutcome::AlreadyTracked => Err(ApiError::conflict("entity is already tracked")),
        TrackOutcome::HubNotConfigured => {
            Err(ApiError::validation("configure your hub in settings first"))
        }
        TrackOutcome::HubFailed(e) => {
            tracing::warn!(entity = %entity_id, error = %e, "hub fetch failed");
            Err(ApiError::upstream())
        }
    }
}

#[utoipa::path(delete, path = "/api/entities/{id}", tag = "Entities",
    params(("id" = Uuid, Path, description = "Tracked entity ID")),
    responses((status = 204)))]
pub async fn untrack_entity(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.entity_repo();
    let uc = UntrackEntity {
        repo: repo.as_ref(),
    };
    if uc.execute(user_id, id).await? {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("entity not found"))
    }
}

#[utoipa::path(get, path = "/api/hub/entities", tag = "Entities",
    responses((status = 200, body = [HubEntityResponse])))]
pub async fn browse_hub_entities(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<HubEntityResponse>>, ApiError> {
    let user_id = validate_bearer(&ctx.cfg, bearer)?;
    let users = ctx.user_repo();
    let hub = ctx.hub_port();
    let uc = BrowseHub {
        users: users.as_ref(),
        hub: hub.as_ref(),
    };
    match uc.execute(user_id).await? {
        BrowseOutcome::Entities(entities) => {
            Ok(Json(entities.into_iter().map(Into::into).collect()))
        }
        BrowseOutcome::HubNotConfigured => {
            Err(ApiError::validation("configure your hub in settings first"))
        }
        BrowseOutcome::HubFailed(e) => {
            tracing::warn!(error = %e, "hub browse failed");
            Err(ApiError::upstream())
        }
    }
}
