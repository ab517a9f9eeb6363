use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of roles a platform account can hold. Stored in the
/// `users.user_role` column and carried inside every issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    StoreOwner,
    Normal,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::StoreOwner, Role::Normal];

    /// normalize
    ///
    /// Maps arbitrary user-supplied role input onto a `Role`. Never fails:
    /// anything unrecognized (including absence) becomes `Normal`, and `Admin`
    /// is only produced by an explicit case-insensitive "admin".
    pub fn normalize(input: Option<&str>) -> Role {
        let Some(raw) = input.filter(|r| !r.is_empty()) else {
            return Role::Normal;
        };

        match raw.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "store_owner" | "owner" | "storeowner" => Role::StoreOwner,
            _ => Role::Normal,
        }
    }

    /// The column value written to `users.user_role`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::StoreOwner => "store_owner",
            Role::Normal => "normal",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,
}

/// Decide whether `role` may enter a route that admits `required`.
///
/// Admin passes every check, including an empty required set. `None` means no
/// identity was resolved for the request.
pub fn authorize(role: Option<Role>, required: &[Role]) -> Result<(), AuthzError> {
    let role = role.ok_or(AuthzError::Unauthorized)?;

    if role == Role::Admin || required.contains(&role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

/// RoutePolicy
///
/// A statically declared set of roles admitted by a route. Handlers name
/// their policy in the `Authorized<P>` extractor, which keeps the whole
/// access matrix visible in the handler signatures.
pub trait RoutePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Administrators only (admin is always admitted, so the set is just `[Admin]`).
pub struct AdminOnly;

impl RoutePolicy for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// Store owners (and, through the override, admins).
pub struct StoreOwners;

impl RoutePolicy for StoreOwners {
    const ALLOWED: &'static [Role] = &[Role::StoreOwner];
}

/// Any signed-in account.
pub struct AnyRole;

impl RoutePolicy for AnyRole {
    const ALLOWED: &'static [Role] = &Role::ALL;
}
