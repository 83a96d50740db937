mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::{routes as auth_routes, JwtValidator};
use crate::features::exports::{routes as exports_routes, ExportService};
use crate::features::geo::routes as geo_routes;
use crate::features::lookups::routes as lookups_routes;
use crate::features::map::{routes as map_routes, MapService};
use crate::features::notifications::{
    build_mailer, routes as notifications_routes, MailingListStore, NotificationService,
};
use crate::features::reports::{routes as reports_routes, PgReportRepository, ReportService};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::storage::LocalStorage;
use crate::shared::templates::{TemplateEngine, TEMPLATE_DIR};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::{middleware::from_fn, Router};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn health_check(State(pool): State<PgPool>) -> StatusCode {
    if database::ping(&pool).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Auth: tokens come from the identity provider, accounts live in our users table
    let jwt_validator = Arc::new(JwtValidator::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
        config.auth.jwt_leeway,
    ));
    let user_service = Arc::new(UserService::new(pool.clone()));
    tracing::info!("Auth configuration initialized");

    let storage = Arc::new(LocalStorage::new(&config.storage));
    storage
        .ensure_dirs()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare upload folders: {}", e))?;
    tracing::info!(
        "Attachment storage ready at {}",
        config.storage.upload_root.display()
    );

    let report_repository = Arc::new(PgReportRepository::new(pool.clone()));
    let report_service = Arc::new(ReportService::new(report_repository, Arc::clone(&storage)));
    let export_service = Arc::new(ExportService::new(Arc::clone(&report_service)));
    let map_service = Arc::new(MapService::new(pool.clone()));
    tracing::info!("Report services initialized");

    let mailing_lists = Arc::new(MailingListStore::new(
        config.notifications.mailing_list_file.clone(),
    ));
    let notification_service = Arc::new(NotificationService::new(
        build_mailer(&config.notifications),
        Arc::clone(&mailing_lists),
        TemplateEngine::with_overrides(Path::new(TEMPLATE_DIR)),
        config.app.site_url.clone(),
        config.notifications.default_recipients.clone(),
    ));
    tracing::info!(
        "Notification service initialized (emails enabled: {})",
        config.notifications.enabled
    );

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let auth_state = middleware::AuthState {
        validator: jwt_validator,
        users: Arc::clone(&user_service),
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(reports_routes::routes(
            Arc::clone(&report_service),
            notification_service,
        ))
        .merge(exports_routes::routes(export_service))
        .merge(map_routes::routes(map_service))
        .merge(geo_routes::routes())
        .merge(lookups_routes::routes())
        .merge(users_routes::admin_routes(user_service))
        .merge(notifications_routes::admin_routes(mailing_lists))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Health check (no auth required)
    let health_route = Router::new()
        .route("/health", axum::routing::get(health_check))
        .with_state(pool.clone());

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
