//! HTTP surface of the registry.
//!
//! | Method | Path                | Auth   |
//! |--------|---------------------|--------|
//! | GET    | `/`                 | none   |
//! | POST   | `/api/signup`       | none   |
//! | POST   | `/api/login`        | none   |
//! | GET    | `/api/patients`     | bearer |
//! | POST   | `/api/patients`     | bearer |
//! | PUT    | `/api/patients/:id` | bearer |
//! | GET    | `/api/demo-data`    | none   |

mod auth;
mod error;
mod patients;

pub use auth::{Credentials, LoginResponse};
pub use error::ApiError;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use iv_drips_core::auth::AuthService;
use iv_drips_core::registry::Registry;
use iv_drips_core::store::PatientStore;
use tokio::sync::Mutex;
use tracing::info;

use crate::log::HTTP;

pub const LANDING_MESSAGE: &str = "IV Monitor Backend Running";

pub type SharedRegistry = Arc<Mutex<Registry<Box<dyn PatientStore>>>>;

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(store: Box<dyn PatientStore>, auth: AuthService) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new(store))),
            auth: Arc::new(auth),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/patients", get(patients::list).post(patients::create))
        .route("/api/patients/:id", put(patients::update))
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .route("/", get(landing))
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/demo-data", get(patients::demo_data))
        .merge(protected)
        .layer(from_fn(cors_middleware))
        .layer(from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn landing() -> &'static str {
    LANDING_MESSAGE
}

/// Any origin may call the API. Preflight requests are answered here.
async fn cors_middleware(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,PUT,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("authorization,content-type"),
    );
    response
}

async fn request_tracing_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        target: HTTP,
        method = %method,
        route = %route,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
