//! 请求体提取器
//!
//! [`ValidatedJson`] 先做 JSON 反序列化，再执行 `validator` 规则，
//! 两类失败都以 400 `ValidationFailed` 返回。

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::utils::AppError;
use crate::utils::validation::describe_errors;

/// JSON body that has passed its `Validate` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::validation(rejection.body_text()))?;

        if let Err(errors) = value.validate() {
            let fields = describe_errors(&errors);
            let mut err = AppError::validation(format!("Invalid request: {}", fields.join(", ")));
            err = err.with_detail("fields", fields);
            return Err(err);
        }

        Ok(ValidatedJson(value))
    }
}
