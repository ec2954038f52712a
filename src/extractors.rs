use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use garde::Validate;
use serde::de::DeserializeOwned;

use crate::db::models::{validate, FieldError, Valid};
use crate::error::AppError;

/// JSON body that has been parsed and validated before the handler runs.
///
/// Well-formed JSON of the wrong shape and values that break a field rule
/// both reject with [`AppError::Validation`]; unparsable bodies reject with
/// [`AppError::BadRequest`].
pub struct ValidatedJson<T>(pub Valid<T>);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate<Context = ()> + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::JsonDataError(e) => {
                    AppError::Validation(vec![FieldError::new("body", e.body_text())])
                }
                other => AppError::BadRequest(other.body_text()),
            })?;

        validate(value).map(ValidatedJson).map_err(AppError::Validation)
    }
}
