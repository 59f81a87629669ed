use std::any::Any;
use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::validation::ValidationErrors;

pub const X_REQUEST_ID: &str = "x-request-id";

const TYPE_BAD_REQUEST: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.1";
const TYPE_UNAUTHORIZED: &str = "https://tools.ietf.org/html/rfc7235#section-3.1";
const TYPE_NOT_FOUND: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.4";
const TYPE_METHOD_NOT_ALLOWED: &str = "https://tools.ietf.org/html/rfc7231#section-6.5.5";
const TYPE_INTERNAL: &str = "https://tools.ietf.org/html/rfc7231#section-6.6.1";

const INTERNAL_DETAIL: &str = "An unexpected error occurred. Please try again later.";

/// Unified error type returned by every fallible handler and extractor.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{detail}")]
    BadRequest { title: &'static str, detail: String },
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            title: "Invalid request",
            detail: detail.into(),
        }
    }

    pub fn registration_conflict() -> Self {
        ApiError::BadRequest {
            title: "Registration failed",
            detail: "A user with this email already exists.".into(),
        }
    }

    /// Shared by the unknown-email, inactive-account and wrong-password paths;
    /// callers must not produce anything more specific.
    pub fn invalid_credentials() -> Self {
        ApiError::BadRequest {
            title: "Login failed",
            detail: "Incorrect email or password.".into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        ApiError::Unauthorized(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        ApiError::NotFound(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn type_uri(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } | ApiError::Validation(_) => TYPE_BAD_REQUEST,
            ApiError::Unauthorized(_) => TYPE_UNAUTHORIZED,
            ApiError::NotFound(_) => TYPE_NOT_FOUND,
            ApiError::Internal(_) => TYPE_INTERNAL,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::BadRequest { title, .. } => title,
            ApiError::Validation(_) => "Validation failed",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::NotFound(_) => "Resource not found",
            ApiError::Internal(_) => "Internal server error",
        }
    }

    /// Client-safe detail; internals never reach the response.
    fn detail(&self) -> String {
        match self {
            ApiError::BadRequest { detail, .. } => detail.clone(),
            ApiError::Validation(_) => "One or more validation errors occurred.".into(),
            ApiError::Unauthorized(detail) | ApiError::NotFound(detail) => detail.clone(),
            ApiError::Internal(_) => INTERNAL_DETAIL.into(),
        }
    }

    fn field_errors(&self) -> Option<BTreeMap<String, Vec<String>>> {
        match self {
            ApiError::Validation(errors) => Some(errors.clone().into_map()),
            _ => None,
        }
    }

    /// Full server-side description, including sources hidden from clients.
    fn log_detail(&self) -> String {
        match self {
            ApiError::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }

    fn body(&self, trace_id: String) -> ErrorBody {
        ErrorBody {
            type_uri: self.type_uri().to_string(),
            title: self.title().to_string(),
            status: self.status().as_u16(),
            detail: self.detail(),
            errors: self.field_errors(),
            trace_id,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

/// RFC 7807-style body shared by every error response.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    pub trace_id: String,
}

/// Attached to error responses so the translator middleware can stamp the
/// request's trace id and emit the log line.
#[derive(Debug, Clone)]
struct ErrorPayload {
    status: StatusCode,
    body: ErrorBody,
    log_detail: String,
}

fn payload_response(payload: ErrorPayload) -> Response {
    let mut res = (payload.status, Json(payload.body.clone())).into_response();
    res.extensions_mut().insert(payload);
    res
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        payload_response(ErrorPayload {
            status: self.status(),
            body: self.body(String::new()),
            log_detail: self.log_detail(),
        })
    }
}

/// Process-wide translator: stamps the request's trace id into every error
/// body, rewraps framework-generated rejections into the same problem shape
/// and writes the server-side log line.
pub async fn translate_errors(req: Request, next: Next) -> Response {
    let trace_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut res = next.run(req).await;

    if let Some(payload) = res.extensions_mut().remove::<ErrorPayload>() {
        return finalize(payload, &trace_id);
    }
    if res.status().is_client_error() || res.status().is_server_error() {
        return finalize(framework_payload(res).await, &trace_id);
    }
    res
}

fn finalize(payload: ErrorPayload, trace_id: &str) -> Response {
    if payload.status.is_server_error() {
        error!(%trace_id, detail = %payload.log_detail, "request failed");
    } else {
        warn!(%trace_id, detail = %payload.log_detail, "request rejected");
    }
    let mut body = payload.body;
    body.trace_id = trace_id.to_string();
    (payload.status, Json(body)).into_response()
}

/// Rejections produced by the framework itself (unmatched routes, bad path
/// parameters) carry a plain-text body.
async fn framework_payload(res: Response) -> ErrorPayload {
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024)
        .await
        .unwrap_or_default();
    let text = String::from_utf8(bytes.to_vec()).unwrap_or_default();

    let (type_uri, title) = match status {
        StatusCode::NOT_FOUND => (TYPE_NOT_FOUND, "Resource not found"),
        StatusCode::METHOD_NOT_ALLOWED => (TYPE_METHOD_NOT_ALLOWED, "Method not allowed"),
        StatusCode::UNAUTHORIZED => (TYPE_UNAUTHORIZED, "Unauthorized"),
        s if s.is_server_error() => (TYPE_INTERNAL, "Internal server error"),
        _ => (TYPE_BAD_REQUEST, "Invalid request"),
    };
    let log_detail = if text.is_empty() {
        status.to_string()
    } else {
        text.clone()
    };
    let detail = if status.is_server_error() {
        INTERNAL_DETAIL.to_string()
    } else if !text.is_empty() {
        text
    } else if status == StatusCode::NOT_FOUND {
        "The requested resource was not found.".to_string()
    } else {
        "The request could not be processed.".to_string()
    };

    ErrorPayload {
        status,
        body: ErrorBody {
            type_uri: type_uri.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail,
            errors: None,
            trace_id: String::new(),
        },
        log_detail,
    }
}

/// Last-resort safety net: a panic anywhere in request handling surfaces as
/// the generic 500 problem body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let panic_message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "opaque panic payload".to_string()
    };
    payload_response(ErrorPayload {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorBody {
            type_uri: TYPE_INTERNAL.to_string(),
            title: "Internal server error".to_string(),
            status: 500,
            detail: INTERNAL_DETAIL.to_string(),
            errors: None,
            trace_id: String::new(),
        },
        log_detail: format!("panic: {panic_message}"),
    })
}

/// `Json` with rejections mapped into the unified problem shape; the default
/// extractor answers malformed bodies with plain text.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}
