use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use hubshare::application::ports::hub_port::HubConfig;
use hubshare::application::services::refresh::EntityRefresher;
use hubshare::bootstrap::app_context::{AppContext, AppServices};
use hubshare::bootstrap::config::Config;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            hubshare::presentation::http::auth::register,
            hubshare::presentation::http::auth::login,
            hubshare::presentation::http::auth::me,
            hubshare::presentation::http::settings::get_settings,
            hubshare::presentation::http::settings::change_password,
            hubshare::presentation::http::settings::configure_hub,
            hubshare::presentation::http::entities::list_entities,
            hubshare::presentation::http::entities::track_entity,
            hubshare::presentation::http::entities::untrack_entity,
            hubshare::presentation::http::entities::browse_hub_entities,
            hubshare::presentation::http::shares::create_share,
            hubshare::presentation::http::shares::list_shares,
            hubshare::presentation::http::shares::update_share,
            hubshare::presentation::http::shares::delete_share,
            hubshare::presentation::http::shares::resolve_share,
            hubshare::presentation::http::shares::trigger_entity,
            hubshare::presentation::http::health::health,
        ),
        components(schemas(
            hubshare::presentation::http::auth::RegisterRequest,
            hubshare::presentation::http::auth::LoginRequest,
            hubshare::presentation::http::auth::LoginResponse,
            hubshare::presentation::http::auth::UserResponse,
            hubshare::presentation::http::settings::SettingsResponse,
            hubshare::presentation::http::settings::ChangePasswordRequest,
            hubshare::presentation::http::settings::ConfigureHubRequest,
            hubshare::presentation::http::entities::TrackedEntityResponse,
            hubshare::presentation::http::entities::HubEntityResponse,
            hubshare::presentation::http::entities::TrackEntityRequest,
            hubshare::presentation::http::shares::CreateShareRequest,
            hubshare::presentation::http::shares::UpdateShareRequest,
            hubshare::presentation::http::shares::ShareLinkResponse,
            hubshare::presentation::http::shares::ResolveShareResponse,
            hubshare::presentation::http::shares::TriggerRequest,
            hubshare::presentation::http::shares::TriggerResponse,
            hubshare::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Authentication"),
            (name = "Settings", description = "Account and hub settings"),
            (name = "Entities", description = "Tracked entity management"),
            (name = "Sharing", description = "Share link lifecycle and public access"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "hubshare=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(port = cfg.api_port, "starting hubshare");

    // Database
    let pool = hubshare::infrastructure::db::connect_pool(&cfg.database_url).await?;
    hubshare::infrastructure::db::migrate(&pool).await?;

    let default_hub = match (&cfg.default_hub_url, &cfg.default_hub_token) {
        (Some(url), Some(token)) => Some(HubConfig {
            base_url: url.clone(),
            token: token.clone(),
        }),
        _ => None,
    };
    if default_hub.is_none() {
        info!("no default hub credential set; users must configure their own");
    }

    let user_repo = Arc::new(
        hubshare::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository::new(
            pool.clone(),
            cfg.encryption_key.clone(),
            default_hub,
        ),
    );
    let entity_repo = Arc::new(
        hubshare::infrastructure::db::repositories::entity_repository_sqlx::SqlxEntityRepository::new(
            pool.clone(),
        ),
    );
    let link_repo = Arc::new(
        hubshare::infrastructure::db::repositories::link_repository_sqlx::SqlxLinkRepository::new(
            pool.clone(),
        ),
    );
    let hub_port = Arc::new(hubshare::infrastructure::hub::client::ReqwestHubClient::new()?);

    let services = AppServices::new(
        user_repo.clone(),
        entity_repo.clone(),
        link_repo,
        hub_port.clone(),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    // Build CORS
    let cors = if let Some(origin) = cfg.frontend_url.clone() {
        match HeaderValue::from_str(&origin) {
            Ok(v) => cors_layer(AllowOrigin::exact(v)),
            Err(_) => cors_layer(AllowOrigin::mirror_request()),
        }
    } else if cfg.is_production {
        cors_layer(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
    } else {
        // Development convenience
        cors_layer(AllowOrigin::mirror_request())
    };

    let app = Router::new()
        .nest(
            "/api",
            hubshare::presentation::http::health::routes(pool.clone()),
        )
        .nest(
            "/api/auth",
            hubshare::presentation::http::auth::routes(ctx.clone()),
        )
        .nest(
            "/api",
            hubshare::presentation::http::settings::routes(ctx.clone()),
        )
        .nest(
            "/api",
            hubshare::presentation::http::entities::routes(ctx.clone()),
        )
        .nest(
            "/api",
            hubshare::presentation::http::shares::routes(ctx.clone()),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Background refresh shares the shutdown signal with the listener
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = EntityRefresher {
        users: user_repo,
        entities: entity_repo,
        hub: hub_port,
    };
    let refresh_interval = Duration::from_secs(cfg.refresh_interval_secs);
    let refresh_handle =
        tokio::spawn(async move { refresher.run(refresh_interval, shutdown_rx).await });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Err(e) = refresh_handle.await {
        error!(?e, "refresher task panicked");
    }
    info!("hubshare stopped");
    Ok(())
}

fn cors_layer(origin: AllowOrigin) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = ?e, "failed to install ctrl-c handler");
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = ?e, "failed to install SIGTERM handler"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
}
