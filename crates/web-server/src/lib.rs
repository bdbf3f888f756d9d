use anyhow::Context;
use api_client::NameApiClient;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use configuration::Settings;
use database::DbRepository;
use registry::{PersonRegistry, PersonService};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn PersonService>,
}

/// Builds the full router: the person endpoints under both the bare and the
/// versioned prefix, a health check, request tracing and panic recovery.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new().route("/health", get(|| async { "OK" }));
    let router = person_routes(router, "/people");
    let router = person_routes(router, "/api/v1/people");

    router
        .with_state(state)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn person_routes(router: Router<Arc<AppState>>, prefix: &str) -> Router<Arc<AppState>> {
    router
        .route(
            prefix,
            get(handlers::list_persons).post(handlers::create_person),
        )
        .route(
            &format!("{prefix}/:id"),
            get(handlers::get_person)
                .put(handlers::update_person)
                .delete(handlers::delete_person),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handler panicked.");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

/// Connects every collaborator and serves the API until the process exits.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    // Tracing is initialised by the binary before we get here.
    let db_pool = database::connect(&settings)
        .await
        .context("failed to connect to the database")?;
    database::run_migrations(&db_pool)
        .await
        .context("failed to run database migrations")?;

    let store = Arc::new(DbRepository::new(db_pool));
    let enricher = Arc::new(NameApiClient::new(&settings)?);
    let service = Arc::new(PersonRegistry::new(store, enricher));
    let app = build_router(Arc::new(AppState { service }));

    let addr = settings.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Web server started and listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
