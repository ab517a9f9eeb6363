use store_rating_api::{
    models::{CreateStoreRequest, LoginRequest, RatingRequest, SignupRequest},
    role::Role,
    validation::{
        ValidationError, looks_like_email, validate_login, validate_password_change,
        validate_rating, validate_store, validate_user_payload,
    },
};

fn signup(name: &str, email: &str, password: &str, address: &str) -> SignupRequest {
    SignupRequest {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        address: Some(address.to_string()),
        role: None,
    }
}

// --- User Payload ---

#[test]
fn test_valid_signup_is_normalized() {
    let mut payload = signup("  Alice  ", "Alice@Example.COM", "secret1", " 1 Main St ");
    payload.role = Some("Store_Owner".to_string());

    let user = validate_user_payload(&payload).expect("payload should be valid");

    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.address, "1 Main St");
    assert_eq!(user.role, Role::StoreOwner);
}

#[test]
fn test_missing_or_empty_field_is_rejected_first() {
    let mut payload = signup("Al", "bad", "x", "");
    assert_eq!(
        validate_user_payload(&payload),
        Err(ValidationError::MissingFields)
    );

    payload.address = None;
    assert_eq!(
        validate_user_payload(&payload),
        Err(ValidationError::MissingFields)
    );
}

#[test]
fn test_name_length_bounds() {
    let short = signup("Al", "al@example.com", "secret1", "Main St");
    assert_eq!(
        validate_user_payload(&short),
        Err(ValidationError::InvalidName)
    );

    let long = signup(&"a".repeat(61), "al@example.com", "secret1", "Main St");
    assert_eq!(
        validate_user_payload(&long),
        Err(ValidationError::InvalidName)
    );

    let padded = signup("  Al  ", "al@example.com", "secret1", "Main St");
    assert_eq!(
        validate_user_payload(&padded),
        Err(ValidationError::InvalidName),
        "length is measured after trimming"
    );

    assert!(validate_user_payload(&signup(&"a".repeat(60), "al@example.com", "secret1", "Main St")).is_ok());
}

#[test]
fn test_rules_apply_in_order() {
    // Invalid email and weak password: the email rule reports first.
    let payload = signup("Alice", "not-an-email", "123", "Main St");
    assert_eq!(
        validate_user_payload(&payload),
        Err(ValidationError::InvalidEmail)
    );

    let payload = signup("Alice", "alice@example.com", "12345", "Main St");
    assert_eq!(
        validate_user_payload(&payload),
        Err(ValidationError::WeakPassword)
    );

    // Signup only asks for six characters, unlike a password change.
    assert!(validate_user_payload(&signup("Alice", "alice@example.com", "abcdef", "Main St")).is_ok());

    let payload = signup("Alice", "alice@example.com", "123456", " A ");
    assert_eq!(
        validate_user_payload(&payload),
        Err(ValidationError::InvalidAddress)
    );
}

#[test]
fn test_unknown_role_becomes_normal() {
    let mut payload = signup("Alice", "alice@example.com", "secret1", "Main St");
    payload.role = Some("superuser".to_string());

    let user = validate_user_payload(&payload).unwrap();
    assert_eq!(user.role, Role::Normal);
}

#[test]
fn test_error_messages_are_client_facing() {
    assert_eq!(
        ValidationError::InvalidName.to_string(),
        "Name must be between 3 and 60 characters."
    );
    assert_eq!(
        ValidationError::RatingOutOfRange.to_string(),
        "Rating must be between 1 and 5"
    );
}

// --- Email ---

#[test]
fn test_email_shape() {
    assert!(looks_like_email("a@b.co"));
    assert!(looks_like_email("first.last@sub.example.org"));

    assert!(!looks_like_email("plainaddress"));
    assert!(!looks_like_email("@example.com"));
    assert!(!looks_like_email("user@.com"));
    assert!(!looks_like_email("user@example."));
    assert!(!looks_like_email("user@example"));
    assert!(!looks_like_email(""));
}

// --- Password Change ---

#[test]
fn test_password_change_policy() {
    assert_eq!(validate_password_change(Some("Abcdefg!")), Ok("Abcdefg!"));
    assert_eq!(
        validate_password_change(Some("Abcdefghijklmno!")),
        Ok("Abcdefghijklmno!")
    );

    for bad in ["Abcdef!", "abcdefgh!", "Abcdefgh1", "Abcdefghijklmnop!"] {
        assert_eq!(
            validate_password_change(Some(bad)),
            Err(ValidationError::PasswordPolicy),
            "{bad} should violate the policy"
        );
    }
}

#[test]
fn test_password_change_requires_value() {
    assert_eq!(
        validate_password_change(None),
        Err(ValidationError::PasswordRequired)
    );
    assert_eq!(
        validate_password_change(Some("")),
        Err(ValidationError::PasswordRequired)
    );
}

// --- Login, Rating, Store ---

#[test]
fn test_login_lowercases_email() {
    let payload = LoginRequest {
        email: Some("Bob@Example.com".to_string()),
        password: Some("pw".to_string()),
    };
    assert_eq!(
        validate_login(&payload),
        Ok(("bob@example.com".to_string(), "pw"))
    );

    let missing = LoginRequest {
        email: Some("bob@example.com".to_string()),
        password: None,
    };
    assert_eq!(
        validate_login(&missing),
        Err(ValidationError::MissingCredentials)
    );
}

#[test]
fn test_rating_bounds() {
    let rating = |store_id, rating| RatingRequest {
        store_id,
        rating,
        comment: None,
    };

    assert_eq!(validate_rating(&rating(Some(1), Some(1))), Ok((1, 1)));
    assert_eq!(validate_rating(&rating(Some(1), Some(5))), Ok((1, 5)));
    assert_eq!(
        validate_rating(&rating(Some(1), Some(6))),
        Err(ValidationError::RatingOutOfRange)
    );
    assert_eq!(
        validate_rating(&rating(Some(1), Some(0))),
        Err(ValidationError::RatingOutOfRange)
    );
    assert_eq!(
        validate_rating(&rating(None, Some(3))),
        Err(ValidationError::MissingRating)
    );
    assert_eq!(
        validate_rating(&rating(Some(0), Some(3))),
        Err(ValidationError::MissingRating)
    );
    assert_eq!(
        validate_rating(&rating(Some(1), None)),
        Err(ValidationError::MissingRating)
    );
}

#[test]
fn test_store_requires_every_field() {
    let complete = CreateStoreRequest {
        name: Some("Corner Shop".to_string()),
        email: Some("shop@example.com".to_string()),
        address: Some("2 High St".to_string()),
        owner_id: Some(4),
    };
    let store = validate_store(&complete).unwrap();
    assert_eq!(store.owner_id, 4);

    let no_owner = CreateStoreRequest {
        owner_id: None,
        ..complete.clone()
    };
    assert_eq!(
        validate_store(&no_owner),
        Err(ValidationError::MissingStoreFields)
    );

    let empty_name = CreateStoreRequest {
        name: Some(String::new()),
        ..complete
    };
    assert_eq!(
        validate_store(&empty_name),
        Err(ValidationError::MissingStoreFields)
    );
}
