use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no token: liveness, account creation, sign-in and the
/// read-only rating views.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        .route("/", get(handlers::root))
        // GET /health
        // Used by load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /signup
        .route("/signup", post(handlers::signup))
        // POST /login
        // Returns a bearer token valid for one day.
        .route("/login", post(handlers::login))
        // GET /ratings/{store_id}
        .route("/ratings/{store_id}", get(handlers::store_ratings))
        // GET /stores/{id}/average-rating
        .route(
            "/stores/{id}/average-rating",
            get(handlers::store_average_rating),
        )
}
