use crate::{
    api::handlers::{health, root},
    cli::globals::GlobalArgs,
    store::UserStore,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, options},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
mod openapi;
pub mod security;

pub use openapi::openapi;

/// Upper bound on request body size; larger JSON bodies never reach a handler.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const REQUEST_ID: &str = "x-request-id";

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Assemble the full application: documented routes, docs UI and middleware.
///
/// # Errors
/// Returns an error if a configured CORS origin is not a valid URL.
pub fn app(globals: &GlobalArgs, store: Arc<dyn UserStore>) -> Result<Router> {
    let cors = cors_layer(&globals.cors_origins)?;

    let (router, openapi) = router().split_for_parts();

    let app = router
        .route("/", get(root::root))
        .route("/health", options(health::health))
        .merge(
            SwaggerUi::new(security::DOCS_PATH)
                .url(format!("{}/openapi.json", security::DOCS_PATH), openapi),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(security::security_headers))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(globals.clone()))
                .layer(Extension(store)),
        );

    Ok(app)
}

/// Serve the application until ctrl-c or SIGTERM.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn new(globals: &GlobalArgs, store: Arc<dyn UserStore>) -> Result<()> {
    let app = app(globals, store)?;

    let listener = TcpListener::bind(format!("::0:{}", globals.port))
        .await
        .with_context(|| format!("Failed to bind port {}", globals.port))?;

    info!("Listening on [::]:{}", globals.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| normalize_origin(origin))
        .collect::<Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

// Browsers send `scheme://host[:port]` without a trailing slash.
fn normalize_origin(origin: &str) -> Result<HeaderValue> {
    let url = Url::parse(origin.trim()).with_context(|| format!("Invalid CORS origin: {origin}"))?;

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin has no host: {origin}"))?;

    let normalized = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };

    HeaderValue::from_str(&normalized).with_context(|| format!("Invalid CORS origin: {origin}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    info_span!(
        "http-request",
        method = %request.method(),
        path,
        request_id
    )
}
