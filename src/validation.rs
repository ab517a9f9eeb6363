use thiserror::Error;

use crate::{
    models::{CreateStoreRequest, LoginRequest, NewStore, NewUser, RatingRequest, SignupRequest},
    role::Role,
};

/// Characters that satisfy the "special character" requirement of a password change.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// ValidationError
///
/// Tagged outcome of a failed payload check. The display text is what the
/// client sees in the 400 body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Name must be between 3 and 60 characters.")]
    InvalidName,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Password must be at least 6 characters long.")]
    WeakPassword,

    #[error("Address must be at least 3 characters long.")]
    InvalidAddress,

    #[error("Password is required")]
    PasswordRequired,

    #[error(
        "Password must be 8-16 characters, include at least one uppercase letter and one special character."
    )]
    PasswordPolicy,

    #[error("Email and password required.")]
    MissingCredentials,

    #[error("Store and rating required")]
    MissingRating,

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,

    #[error("Missing required fields")]
    MissingStoreFields,

    #[error("owner_id must be an integer")]
    InvalidOwnerId,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// validate_user_payload
///
/// Signup and admin user creation share this check. Rules run in a fixed
/// order and the first failure is returned.
///
/// On success the payload is normalized for storage: name and address are
/// trimmed, the email lower-cased and the requested role normalized.
pub fn validate_user_payload(payload: &SignupRequest) -> Result<NewUser, ValidationError> {
    let (Some(name), Some(email), Some(password), Some(address)) = (
        present(&payload.name),
        present(&payload.email),
        present(&payload.password),
        present(&payload.address),
    ) else {
        return Err(ValidationError::MissingFields);
    };

    let name = name.trim();
    if !(3..=60).contains(&name.chars().count()) {
        return Err(ValidationError::InvalidName);
    }

    if !looks_like_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::WeakPassword);
    }

    let address = address.trim();
    if address.chars().count() < 3 {
        return Err(ValidationError::InvalidAddress);
    }

    Ok(NewUser {
        name: name.to_string(),
        email: email.to_lowercase(),
        password: password.to_string(),
        address: address.to_string(),
        role: Role::normalize(payload.role.as_deref()),
    })
}

/// looks_like_email
///
/// Minimal `local@domain.tld` check: some whitespace-free run of the input
/// must contain a non-empty part before an `@`, then a non-empty part before
/// a `.`, then a non-empty tail.
pub fn looks_like_email(input: &str) -> bool {
    input.split_whitespace().any(|token| {
        let chars: Vec<char> = token.chars().collect();
        let Some(at) = chars.iter().skip(1).position(|&c| c == '@').map(|p| p + 1) else {
            return false;
        };
        // The last dot that still leaves at least one character after it.
        let dot = chars[..chars.len().saturating_sub(1)]
            .iter()
            .rposition(|&c| c == '.');
        matches!(dot, Some(d) if d >= at + 2)
    })
}

/// validate_password_change
///
/// Stricter than the signup rule: 8 to 16 characters with at least one
/// uppercase letter and one character from `PASSWORD_SPECIAL_CHARS`.
/// Only applied when an existing account changes its password.
pub fn validate_password_change(password: Option<&str>) -> Result<&str, ValidationError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(ValidationError::PasswordRequired)?;

    let length_ok = (8..=16).contains(&password.chars().count());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if length_ok && has_upper && has_special {
        Ok(password)
    } else {
        Err(ValidationError::PasswordPolicy)
    }
}

/// Returns the lower-cased email and the password to check.
pub fn validate_login(payload: &LoginRequest) -> Result<(String, &str), ValidationError> {
    match (present(&payload.email), present(&payload.password)) {
        (Some(email), Some(password)) => Ok((email.to_lowercase(), password)),
        _ => Err(ValidationError::MissingCredentials),
    }
}

/// Returns `(store_id, rating)` when both are present and the rating is 1..=5.
pub fn validate_rating(payload: &RatingRequest) -> Result<(i32, i32), ValidationError> {
    let (Some(store_id), Some(rating)) = (payload.store_id.filter(|id| *id != 0), payload.rating)
    else {
        return Err(ValidationError::MissingRating);
    };

    if !(1..=5).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange);
    }

    Ok((store_id, rating))
}

pub fn validate_store(payload: &CreateStoreRequest) -> Result<NewStore, ValidationError> {
    match (
        present(&payload.name),
        present(&payload.email),
        present(&payload.address),
        payload.owner_id.filter(|id| *id != 0),
    ) {
        (Some(name), Some(email), Some(address), Some(owner_id)) => Ok(NewStore {
            name: name.to_string(),
            email: email.to_string(),
            address: address.to_string(),
            owner_id,
        }),
        _ => Err(ValidationError::MissingStoreFields),
    }
}
