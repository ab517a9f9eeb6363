use crate::{
    AppState,
    auth::{Authorized, issue_token},
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        AdminDashboard, CreateStoreRequest, LoginRequest, LoginResponse, LoginUser,
        MessageResponse, OwnerDashboard, PasswordChangeRequest, Rating, RatingRequest,
        RatingStats, SignupRequest, Store, StoreListParams, StoreListing, StoreRatings,
        UserListParams, UserSummary,
    },
    password::{hash_password, verify_password},
    repository::RepoError,
    role::{AdminOnly, AnyRole, Role, StoreOwners},
    validation::{
        validate_login, validate_password_change, validate_rating, validate_store,
        validate_user_payload,
    },
};
use axum::{Json, extract::State, http::StatusCode};

// --- Shared Flows ---

/// register
///
/// Validation, hashing and insertion shared by public signup and admin
/// user creation. A duplicate email is a 409.
async fn register(
    state: &AppState,
    payload: &SignupRequest,
    context: &str,
) -> Result<UserSummary, ApiError> {
    let new_user = validate_user_payload(payload)?;
    let password_hash = hash_password(&new_user.password, state.config.bcrypt_cost).await?;

    let user = state
        .repo
        .create_user(new_user, password_hash)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => ApiError::Conflict("Email already exists.".to_string()),
            other => ApiError::internal(other, context),
        })?;

    tracing::info!(user_id = user.id, role = %user.role, "{} created user", context);
    Ok(user)
}

// --- Public Handlers ---

/// root
///
/// [Public Route] Liveness banner.
pub async fn root() -> &'static str {
    "Backend is running"
}

/// signup
///
/// [Public Route] Creates an account. The requested role is normalized, so
/// unknown values become `normal`.
///
/// Any caller may request `admin` here; the role is taken from the payload as is.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Created", body = UserSummary),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let user = register(&state, &payload, "Signup").await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// login
///
/// [Public Route] Exchanges email and password for a bearer token valid for
/// one day. Unknown email and wrong password are indistinguishable.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Email and password required"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = validate_login(&payload)?;
    let invalid = || ApiError::Unauthorized("Invalid credentials.".to_string());

    let user = state
        .repo
        .find_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal(e, "Login"))?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash).await? {
        return Err(invalid());
    }

    let role = Role::normalize(Some(&user.user_role));
    let token = issue_token(user.id, role, &state.config.jwt_secret)?;

    tracing::info!(user_id = user.id, %role, "user signed in");
    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        },
    }))
}

/// store_ratings
///
/// [Public Route] Every rating of a store with the rater's name, plus the
/// store's aggregate.
#[utoipa::path(
    get,
    path = "/ratings/{store_id}",
    params(("store_id" = i32, Path, description = "Store ID")),
    responses((status = 200, description = "Ratings", body = StoreRatings))
)]
pub async fn store_ratings(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i32>,
) -> Result<Json<StoreRatings>, ApiError> {
    let ratings = state
        .repo
        .store_ratings(store_id)
        .await
        .map_err(|e| ApiError::internal(e, "Ratings fetch"))?;
    let stats = state
        .repo
        .rating_stats(store_id)
        .await
        .map_err(|e| ApiError::internal(e, "Ratings fetch"))?;

    Ok(Json(StoreRatings { ratings, stats }))
}

/// store_average_rating
///
/// [Public Route] Average and count for a single store.
#[utoipa::path(
    get,
    path = "/stores/{id}/average-rating",
    params(("id" = i32, Path, description = "Store ID")),
    responses((status = 200, description = "Aggregate", body = RatingStats))
)]
pub async fn store_average_rating(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<i32>,
) -> Result<Json<RatingStats>, ApiError> {
    let stats = state
        .repo
        .rating_stats(store_id)
        .await
        .map_err(|e| ApiError::internal(e, "Average rating"))?;
    Ok(Json(stats))
}

// --- Authenticated Handlers ---

/// list_stores
///
/// [Authenticated Route] Lists stores with their average rating and the
/// caller's own rating. Supports `name`/`address` substring filters, an exact
/// `owner_id` filter, and `sortBy`/`order`.
#[utoipa::path(
    get,
    path = "/stores",
    params(StoreListParams),
    responses((status = 200, description = "Stores", body = [StoreListing]))
)]
pub async fn list_stores(
    caller: Authorized<AnyRole>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StoreListParams>,
) -> Result<Json<Vec<StoreListing>>, ApiError> {
    let query = params.to_query(caller.user.id)?;
    let stores = state
        .repo
        .list_stores(&query)
        .await
        .map_err(|e| ApiError::internal(e, "Stores list"))?;
    Ok(Json(stores))
}

/// submit_rating
///
/// [Authenticated Route] Rates a store from 1 to 5. Submitting again
/// replaces the caller's previous rating for that store.
#[utoipa::path(
    post,
    path = "/ratings",
    request_body = RatingRequest,
    responses(
        (status = 200, description = "Saved", body = Rating),
        (status = 400, description = "Missing or out-of-range rating"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn submit_rating(
    caller: Authorized<AnyRole>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RatingRequest>,
) -> Result<Json<Rating>, ApiError> {
    let (store_id, rating) = validate_rating(&payload)?;

    let saved = state
        .repo
        .upsert_rating(caller.user.id, store_id, rating, payload.comment)
        .await
        .map_err(|e| match e {
            RepoError::MissingReference => ApiError::NotFound("Store not found".to_string()),
            other => ApiError::internal(other, "Ratings upsert"),
        })?;

    Ok(Json(saved))
}

/// update_password
///
/// [Authenticated Route] Changes a password. Callers may only change their
/// own, except admins. The new password must pass the strict policy
/// (8-16 characters, an uppercase letter and a special character).
#[utoipa::path(
    put,
    path = "/users/{id}/password",
    params(("id" = i32, Path, description = "User ID")),
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Password policy violated"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_password(
    caller: Authorized<AnyRole>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<PasswordChangeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if caller.user.id != id && caller.user.role != Role::Admin {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let password = validate_password_change(payload.password.as_deref())?;
    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;

    let updated = state
        .repo
        .update_password(id, password_hash)
        .await
        .map_err(|e| ApiError::internal(e, "Password update"))?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, changed_by = caller.user.id, "password updated");
    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

/// owner_dashboard
///
/// [Store Owner Route] The owner's store with its average rating and the
/// users who rated it. Only the owner themself may view it; the admin
/// override gets past the role check but not this identity check.
#[utoipa::path(
    get,
    path = "/owner/{id}/dashboard",
    params(("id" = i32, Path, description = "Owner's user ID")),
    responses(
        (status = 200, description = "Dashboard", body = OwnerDashboard),
        (status = 403, description = "Not this owner"),
        (status = 404, description = "Owner has no store")
    )
)]
pub async fn owner_dashboard(
    caller: Authorized<StoreOwners>,
    State(state): State<AppState>,
    ApiPath(owner_id): ApiPath<i32>,
) -> Result<Json<OwnerDashboard>, ApiError> {
    if caller.user.id != owner_id {
        return Err(ApiError::Forbidden("Unauthorized: Access denied".to_string()));
    }

    state
        .repo
        .owner_dashboard(owner_id)
        .await
        .map_err(|e| ApiError::internal(e, "Owner dashboard"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No store found for this owner".to_string()))
}

// --- Admin Handlers ---

/// create_user
///
/// [Admin Route] Creates an account of any role. Same validation as signup.
#[utoipa::path(
    post,
    path = "/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Created", body = UserSummary),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let user = register(&state, &payload, "Add user").await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// list_users
///
/// [Admin Route] Lists users with `name`/`email`/`address` substring
/// filters, an exact `role` filter, and `sortBy`/`order`. An unknown
/// `sortBy` column falls back to `id` instead of failing.
#[utoipa::path(
    get,
    path = "/users",
    params(UserListParams),
    responses((status = 200, description = "Users", body = [UserSummary]))
)]
pub async fn list_users(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let query = params.to_query();
    let users = state
        .repo
        .list_users(&query)
        .await
        .map_err(|e| ApiError::internal(e, "Users list"))?;
    Ok(Json(users))
}

/// create_store
///
/// [Admin Route] Registers a store for an existing owner.
#[utoipa::path(
    post,
    path = "/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Created", body = Store),
        (status = 400, description = "Missing fields or unknown owner")
    )
)]
pub async fn create_store(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let new_store = validate_store(&payload)?;

    let store = state
        .repo
        .create_store(new_store)
        .await
        .map_err(|e| match e {
            RepoError::MissingReference => ApiError::BadRequest("Owner does not exist.".to_string()),
            other => ApiError::internal(other, "Add store"),
        })?;

    tracing::info!(store_id = store.id, owner_id = ?store.owner_id, "store created");
    Ok((StatusCode::CREATED, Json(store)))
}

/// admin_dashboard
///
/// [Admin Route] Platform totals, every store with owner and average rating,
/// and every user.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses((status = 200, description = "Dashboard", body = AdminDashboard))
)]
pub async fn admin_dashboard(
    _admin: Authorized<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboard>, ApiError> {
    let dashboard = state
        .repo
        .admin_dashboard()
        .await
        .map_err(|e| ApiError::internal(e, "Admin dashboard"))?;
    Ok(Json(dashboard))
}
