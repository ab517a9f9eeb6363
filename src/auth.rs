use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::AppConfig,
    error::ApiError,
    role::{AuthzError, Role, RoutePolicy, authorize},
};

/// Validity window of an issued token: one day.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Claims
///
/// The payload signed into every token issued by `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The `users.id` of the holder.
    pub id: i32,
    /// Role at the time of issuance. Role changes take effect on next login.
    pub role: Role,
    /// Issued At (iat).
    pub iat: usize,
    /// Expiration Time (exp). Checked on every request.
    pub exp: usize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Header absent, not a Bearer credential, or empty.
    #[error("No token provided")]
    NoToken,
    /// Bad signature, malformed, expired or carrying an unknown role.
    #[error("Invalid token")]
    InvalidToken,
}

/// issue_token
///
/// Signs `{id, role}` with the process secret, valid for `TOKEN_TTL_SECS`.
pub fn issue_token(id: i32, role: Role, secret: &str) -> Result<String, ApiError> {
    let now = get_current_timestamp();
    let claims = Claims {
        id,
        role,
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token signing error: {:?}", e);
        ApiError::Internal
    })
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// authenticate
///
/// Verifies the bearer credential in `header_value` against `secret`.
/// Absence is `NoToken` (401); anything that fails verification, including
/// expiry, is `InvalidToken` (403).
pub fn authenticate(header_value: Option<&str>, secret: &str) -> Result<Claims, AuthError> {
    let token = bearer_token(header_value).ok_or(AuthError::NoToken)?;

    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!("rejected token: {:?}", other),
            }
            AuthError::InvalidToken
        })
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
///
/// `auth_middleware` resolves it once and stores it in the request
/// extensions; the extractor reuses that copy and only verifies the header
/// itself when no middleware ran before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let config = AppConfig::from_ref(state);
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let claims = authenticate(header_value, &config.jwt_secret)?;
        Ok(AuthUser::from(claims))
    }
}

/// Authorized
///
/// An `AuthUser` that also satisfies the route policy `P`. Must run behind
/// `auth_middleware`: a request with no resolved identity is rejected as
/// 401 "Unauthorized", a role outside `P::ALLOWED` as 403 "Access denied".
pub struct Authorized<P: RoutePolicy> {
    pub user: AuthUser,
    _policy: PhantomData<P>,
}

impl<P: RoutePolicy> Authorized<P> {
    /// Apply the policy to an optionally resolved identity.
    pub fn check(user: Option<AuthUser>) -> Result<Self, AuthzError> {
        authorize(user.map(|u| u.role), P::ALLOWED)?;
        user.map(|user| Self {
            user,
            _policy: PhantomData,
        })
        .ok_or(AuthzError::Unauthorized)
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: RoutePolicy,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthUser>().copied();
        Ok(Self::check(user)?)
    }
}
