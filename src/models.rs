use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::role::Role;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A full row of the `users` table. Only used internally (login); it carries
/// the password hash and is never serialized back to a client.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub user_role: String,
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// UserSummary
///
/// The public projection of a user used by signup, admin creation, listing
/// and the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: String,
}

/// Store
///
/// A row of the `stores` table as returned after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<i32>,
}

/// StoreListing
///
/// A store as seen by a signed-in user in `GET /stores`: the overall average
/// and the caller's own rating, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct StoreListing {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<i32>,
    pub avg_rating: f64,
    pub user_rating: Option<i32>,
}

/// Rating
///
/// A row of the `ratings` table. One per (user, store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Rating {
    pub id: i32,
    pub store_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// RatingWithUser
///
/// A rating joined with the rater's display name (`GET /ratings/{store_id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RatingWithUser {
    pub id: i32,
    pub store_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
    pub user_name: String,
}

/// RatingStats
///
/// Aggregate for a single store. `avg_rating` is null while the store has no ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RatingStats {
    pub avg_rating: Option<f64>,
    pub total_ratings: i64,
}

// --- Request Payloads (Input Schemas) ---

/// SignupRequest
///
/// Input payload for `POST /signup` and the admin-only `POST /users`.
/// Every field is optional at the type level so that absence is reported as
/// a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    /// Free-form; normalized to one of `admin`, `store_owner`, `normal`.
    pub role: Option<String>,
}

/// NewUser
///
/// A validated signup payload, ready to hash and insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// LoginResponse
///
/// The signed token plus enough of the profile for the client to route by role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PasswordChangeRequest {
    pub password: Option<String>,
}

/// RatingRequest
///
/// Input payload for `POST /ratings`. Submitting again for the same store
/// replaces the caller's previous rating.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RatingRequest {
    pub store_id: Option<i32>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

// --- Listing Parameters (Query Strings) ---

/// UserListParams
///
/// Query parameters for `GET /users`. Empty values are treated as absent.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<String>,
    /// Exact match on the stored role.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub role: Option<String>,
    /// Column to sort by; unknown columns fall back to `id`.
    #[serde(rename = "sortBy", default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order: Option<String>,
}

/// StoreListParams
///
/// Query parameters for `GET /stores`.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct StoreListParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub owner_id: Option<String>,
    #[serde(rename = "sortBy", default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

// --- Dashboard Schemas (Output) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardCounts {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// StoreOverview
///
/// A store with its owner's identity and average rating, as listed on the
/// admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct StoreOverview {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<i32>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub avg_rating: f64,
}

/// AdminDashboard
///
/// Output schema for `GET /admin/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboard {
    pub counts: DashboardCounts,
    pub stores: Vec<StoreOverview>,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct OwnedStore {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub avg_rating: f64,
}

/// StoreRater
///
/// One user who rated the owner's store, with their rating and comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct StoreRater {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub comment: Option<String>,
}

/// OwnerDashboard
///
/// Output schema for `GET /owner/{id}/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct OwnerDashboard {
    pub store: OwnedStore,
    pub users: Vec<StoreRater>,
}

/// StoreRatings
///
/// Output schema for `GET /ratings/{store_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct StoreRatings {
    pub ratings: Vec<RatingWithUser>,
    pub stats: RatingStats,
}
