use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query},
};

use crate::error::ApiError;

// Thin wrappers over the stock extractors so that malformed input is reported
// as a 400 with the usual `{"message": ...}` body.

#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
