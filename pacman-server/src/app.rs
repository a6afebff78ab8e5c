use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tracing::info_span;

use crate::registry::RoomRegistry;
use crate::{routes, transport};

/// Liveness surface for the process: whether the registry's background
/// tasks (event drain, TTL sweep) are still alive. This process has no
/// database to report on, so the health surface tracks registry readiness
/// instead.
#[derive(Debug, Clone, Default)]
pub struct Health {
    registry_ready: bool,
}

impl Health {
    pub fn ok(&self) -> bool {
        self.registry_ready
    }

    pub fn set_registry_ready(&mut self, ready: bool) {
        self.registry_ready = ready;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub health: Arc<tokio::sync::RwLock<Health>>,
}

impl AppState {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        let mut health = Health::default();
        health.set_registry_ready(true);
        AppState {
            registry,
            health: Arc::new(tokio::sync::RwLock::new(health)),
        }
    }
}

/// Create a custom span for HTTP requests with reduced verbosity.
pub fn make_span<B>(request: &axum::http::Request<B>) -> tracing::Span {
    let path = request
        .uri()
        .path_and_query()
        .map(|v| v.as_str())
        .unwrap_or_else(|| request.uri().path());

    if request.method() == axum::http::Method::GET {
        info_span!("request", path = %path)
    } else {
        info_span!("request", method = %request.method(), path = %path)
    }
}

/// Create the application router: a health endpoint, a `POST /rooms`
/// room-creation endpoint for clients that want a room code before opening
/// a socket, and the WebSocket upgrade endpoint the transport boundary
/// routes every inbound game event through.
pub fn create_router(app_state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(|| async { "Pac-Man multiplayer server." }))
        .route("/health", get(routes::health_handler))
        .route("/rooms", post(routes::create_room_handler))
        .route("/ws/{room_code}", get(transport::ws_handler))
        .with_state(app_state)
        .layer(axum::middleware::from_fn(inject_server_header));

    router.layer(
        tower_http::trace::TraceLayer::new_for_http()
            .make_span_with(make_span)
            .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {}),
    )
}

async fn inject_server_header(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut res = next.run(req).await;
    res.headers_mut().insert(
        axum::http::header::SERVER,
        axum::http::HeaderValue::from_static(SERVER_HEADER_VALUE),
    );
    res
}

const SERVER_HEADER_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
