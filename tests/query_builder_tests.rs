use store_rating_api::{
    models::{StoreListParams, UserListParams},
    query::{
        FilterSet, Resource, STORE_SORT_COLUMNS, SortDirection, SortSpec, SqlParam,
        USER_SORT_COLUMNS, build,
    },
    validation::ValidationError,
};

// --- Sorting ---

#[test]
fn test_sort_falls_back_to_id() {
    let sort = SortSpec::resolve(USER_SORT_COLUMNS, Some("password_hash"), None);
    assert_eq!(sort.field, "id");
    assert_eq!(sort.direction, SortDirection::Asc);

    let sort = SortSpec::resolve(USER_SORT_COLUMNS, None, Some("DESC"));
    assert_eq!(sort.field, "id");
    assert_eq!(sort.direction, SortDirection::Desc);
}

#[test]
fn test_allowed_sort_column_is_used() {
    let sort = SortSpec::resolve(STORE_SORT_COLUMNS, Some("name"), Some("desc"));
    assert_eq!(sort.field, "name");
    assert_eq!(sort.direction, SortDirection::Desc);

    // Only "desc" flips the order.
    let sort = SortSpec::resolve(STORE_SORT_COLUMNS, Some("address"), Some("sideways"));
    assert_eq!(sort.direction, SortDirection::Asc);
}

#[test]
fn test_injection_attempt_in_sort_never_reaches_sql() {
    let params = UserListParams {
        sort_by: Some("name; DROP TABLE users".to_string()),
        order: Some("asc; DELETE FROM ratings".to_string()),
        ..Default::default()
    };

    let query = params.to_query();

    assert!(query.sql.ends_with(" ORDER BY id ASC"));
    assert!(!query.sql.contains("DROP"));
    assert!(!query.sql.contains("DELETE"));
    assert!(query.params.is_empty());
}

// --- Filtering ---

#[test]
fn test_user_filters_are_bound_in_order() {
    let params = UserListParams {
        name: Some("ann".to_string()),
        address: Some("' OR 1=1 --".to_string()),
        role: Some("store_owner".to_string()),
        sort_by: Some("email".to_string()),
        order: Some("desc".to_string()),
        ..Default::default()
    };

    let query = params.to_query();

    assert_eq!(
        query.sql,
        "SELECT id, name, email, address, user_role AS role FROM users WHERE 1=1 \
         AND name ILIKE $1 AND address ILIKE $2 AND user_role = $3 ORDER BY email DESC"
    );
    assert_eq!(
        query.params,
        vec![
            SqlParam::Text("%ann%".to_string()),
            SqlParam::Text("%' OR 1=1 --%".to_string()),
            SqlParam::Text("store_owner".to_string()),
        ]
    );
    assert!(!query.sql.contains("OR 1=1"));
}

#[test]
fn test_empty_filters_are_skipped() {
    let filters = FilterSet::new()
        .contains("name", Some(""))
        .contains("email", None)
        .equals_int("owner_id", None);
    assert!(filters.is_empty());

    let query = build(&Resource::Users, &filters, None, None);
    assert!(!query.sql.contains(" AND "));
}

#[test]
fn test_store_query_numbers_filters_after_viewer() {
    let params = StoreListParams {
        name: Some("cafe".to_string()),
        owner_id: Some("12".to_string()),
        sort_by: Some("owner_id".to_string()),
        ..Default::default()
    };

    let query = params.to_query(5).unwrap();

    assert!(query.sql.contains("ur.user_id = $1"));
    assert!(query.sql.contains(" AND s.name ILIKE $2 AND s.owner_id = $3"));
    assert!(query.sql.ends_with(" GROUP BY s.id, ur.rating ORDER BY s.owner_id ASC"));
    assert_eq!(
        query.params,
        vec![
            SqlParam::Int(5),
            SqlParam::Text("%cafe%".to_string()),
            SqlParam::Int(12),
        ]
    );
}

#[test]
fn test_store_owner_filter_must_be_integer() {
    let params = StoreListParams {
        owner_id: Some("12 OR 1=1".to_string()),
        ..Default::default()
    };

    assert_eq!(params.to_query(1), Err(ValidationError::InvalidOwnerId));
}

#[test]
fn test_store_sort_rejects_user_only_columns() {
    let params = StoreListParams {
        sort_by: Some("email".to_string()),
        ..Default::default()
    };

    let query = params.to_query(1).unwrap();
    assert!(query.sql.ends_with(" ORDER BY s.id ASC"));
}
