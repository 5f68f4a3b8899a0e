use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    serve, Router,
};
use orderdesk_database::{initialize_order_store, OrderStore};
use orderdesk_utils::{init_logging, AppConfig, OrderXmlImporter, ServerConfig, StorageBackend};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

mod handlers;
mod import;
mod metrics;
mod middleware;
mod routes;

const CONFIG_DIR: &str = "config";

use handlers::{health_check, metrics_handler};
use import::{OrderImportService, TracingNotifier};
use middleware::{request_id_middleware, SessionResolver, StaticSessionResolver};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(Path::new(CONFIG_DIR))?;

    init_logging(&config.logging)?;
    info!("Starting OrderDesk API Gateway");

    let db_config = match config.database.backend {
        StorageBackend::Postgres => orderdesk_database::DatabaseConfig::Postgres {
            url: config.database.postgres_url.clone(),
            max_connections: config.database.max_connections,
            connection_timeout: Duration::from_secs(config.database.connection_timeout_seconds),
        },
        StorageBackend::Memory => orderdesk_database::DatabaseConfig::Memory,
    };
    let store = initialize_order_store(&db_config).await?;
    info!(backend = ?config.database.backend, "Order store ready");

    let state = build_state(&config, store)?;
    let app = create_app(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("API Gateway listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

/// Load and check configuration. A bad file stops startup.
fn load_config(dir: &Path) -> Result<AppConfig> {
    let config = AppConfig::load_from(dir).context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_state(config: &AppConfig, store: Arc<dyn OrderStore>) -> Result<AppState> {
    let schema = config.import.resolve_schema()?;
    info!(schema = %schema.name, root = %schema.root, "Order import schema loaded");

    let imports = OrderImportService::new(
        OrderXmlImporter::new(schema),
        store.clone(),
        Arc::new(TracingNotifier),
        config.import.clone(),
    );

    Ok(AppState {
        store,
        sessions: Arc::new(StaticSessionResolver::from_config(&config.auth)),
        imports: Arc::new(imports),
        config: config.clone(),
    })
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::create_api_routes(state.clone()))
        .with_state(state);

    with_middleware(router, &config.server)
}

fn with_middleware(router: Router, server: &ServerConfig) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(server.timeout_seconds)))
            .layer(DefaultBodyLimit::max(server.max_request_size))
            .layer(axum::middleware::from_fn(request_id_middleware)),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub sessions: Arc<dyn SessionResolver>,
    pub imports: Arc<OrderImportService>,
    pub config: AppConfig,
}
