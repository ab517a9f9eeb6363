use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Identity, access control and input rules.
pub mod auth;
pub mod password;
pub mod role;
pub mod validation;

// Request handling and persistence.
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;

pub mod config;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and schema into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::signup, handlers::login, handlers::store_ratings,
        handlers::store_average_rating, handlers::list_stores, handlers::submit_rating,
        handlers::update_password, handlers::owner_dashboard, handlers::create_user,
        handlers::list_users, handlers::create_store, handlers::admin_dashboard
    ),
    components(
        schemas(
            role::Role, models::UserSummary, models::Store, models::StoreListing,
            models::Rating, models::RatingWithUser, models::RatingStats,
            models::SignupRequest, models::LoginRequest, models::LoginResponse,
            models::LoginUser, models::CreateStoreRequest, models::PasswordChangeRequest,
            models::RatingRequest, models::MessageResponse, models::DashboardCounts,
            models::StoreOverview, models::AdminDashboard, models::OwnedStore,
            models::StoreRater, models::OwnerDashboard, models::StoreRatings,
        )
    ),
    tags(
        (name = "store-rating", description = "Store Rating Platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container for the persistence layer and configuration.
/// Cloned per request; both members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: all database access goes through this trait object.
    pub repo: RepositoryState,
    /// Configuration: loaded once at startup.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated router. The `AuthUser` extractor verifies the
/// bearer token and rejects the request (401 without a token, 403 for a bad
/// one) before any handler runs. On success the identity is stored in the
/// request extensions, where `Authorized<P>` picks it up.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies scoped and global middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // `route_layer` so unmatched paths still 404 instead of 401.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request carries its
/// `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
