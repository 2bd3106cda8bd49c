//! Validated JSON extraction.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON is a 400; a body that parses but fails validation is a 422
/// with field-level details.
///
/// ```ignore
/// async fn copy(
///     ValidatedJson(request): ValidatedJson<CopyMoveRequest>,
/// ) -> Result<Json<ObjectItem>, ApiError> {
///     // request is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// Reject strings that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_blank")
            .with_message("Must not be blank".into()));
    }
    Ok(())
}
