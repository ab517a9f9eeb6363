use crate::error::ApiError;

/// hash_password
///
/// Salted bcrypt hash at `cost`, computed on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("password hashing task failed: {:?}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            tracing::error!("password hashing error: {:?}", e);
            ApiError::Internal
        })
}

/// verify_password
///
/// `Ok(false)` on mismatch. A stored value that is not a bcrypt hash is an
/// internal error, not a failed login.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("password verification task failed: {:?}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            tracing::error!("password verification error: {:?}", e);
            ApiError::Internal
        })
}
