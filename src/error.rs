use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// One or more request fields failed validation. Serialized as an
    /// `errors` array so clients can show per-field messages.
    #[error("validation failed")]
    Validation(Vec<String>),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(vec![msg.into()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => {
                let msgs: Vec<_> = errors.iter().map(|m| json!({ "msg": m })).collect();
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "errors": msgs, "status": 400 }),
                )
            }
            ApiError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": self.to_string(), "status": 401 }),
            ),
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string(), "status": 404 }),
            ),
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "status": 400 }),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string(), "status": 500 }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `Json` body extractor that reports malformed or missing bodies through
/// the same `{errors: [...]}` envelope as field validation, instead of
/// axum's plain-text 422 rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}
