use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind `auth_middleware`, so handlers can rely on an
/// `AuthUser` in the request extensions. Which roles may call a route is
/// declared by the handler's `Authorized<P>` argument:
///
/// | Route                        | Policy        |
/// |------------------------------|---------------|
/// | `GET /users`, `POST /users`  | `AdminOnly`   |
/// | `POST /stores`               | `AdminOnly`   |
/// | `GET /admin/dashboard`       | `AdminOnly`   |
/// | `GET /stores`                | `AnyRole`     |
/// | `POST /ratings`              | `AnyRole`     |
/// | `PUT /users/{id}/password`   | `AnyRole`     |
/// | `GET /owner/{id}/dashboard`  | `StoreOwners` |
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Users ---
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        // PUT /users/{id}/password
        // Self-service; admins may change anyone's.
        .route("/users/{id}/password", put(handlers::update_password))
        // --- Stores & Ratings ---
        // GET lists with the caller's own rating joined in; POST is admin-only.
        .route(
            "/stores",
            get(handlers::list_stores).post(handlers::create_store),
        )
        .route("/ratings", post(handlers::submit_rating))
        // --- Dashboards ---
        .route("/owner/{id}/dashboard", get(handlers::owner_dashboard))
        .route("/admin/dashboard", get(handlers::admin_dashboard))
}
