use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer};
use validator::Validate;

use crate::error::ApiError;

/// A JSON request body with a fixed client-facing rejection message.
pub trait RequestBody: DeserializeOwned + Validate {
    const REJECTION: &'static str;
}

/// A JSON body that also runs `validator` rules. The body is parsed whatever
/// the `Content-Type` says; malformed JSON, wrong types and failed rules all
/// end up as the same 400.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RequestBody,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation {
                message: T::REJECTION,
                detail: rejection.body_text(),
            })?;

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(|rejection| {
            ApiError::Validation {
                message: T::REJECTION,
                detail: rejection.body_text(),
            }
        })?;

        value.validate().map_err(|errors| ApiError::Validation {
            message: T::REJECTION,
            detail: errors.to_string(),
        })?;

        Ok(Self(value))
    }
}

/// Accepts any JSON number with no fractional part (`2` and `2.0` alike) that
/// fits in an `i32`.
pub fn whole_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(de::Error::invalid_value(
            de::Unexpected::Float(value),
            &"a whole number",
        ));
    }
    Ok(value as i32)
}
