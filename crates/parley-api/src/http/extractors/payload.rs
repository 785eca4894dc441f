//! JSON body extractor with a uniform rejection.
//!
//! Wraps axum's `Json` so that every way a body can be wrong (missing
//! content type, malformed JSON, missing field, wrong field type) produces
//! the same 400 response.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::http::error::AppError;

/// A JSON request body deserialized into `T`.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Rejected request payload");
                Err(AppError::InvalidPayload)
            }
        }
    }
}
