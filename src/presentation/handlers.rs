use crate::application::auth_service::AuthService;
use crate::application::recipe_service::RecipeService;
use crate::data::recipe_repository::InMemoryRecipeRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::{DomainError, FieldErrors};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub recipe_service: RecipeService<InMemoryRecipeRepository>,
    pub auth_service: AuthService<InMemoryUserRepository>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error")]
    Validation(FieldErrors),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Validation(fields) => {
                serde_json::to_value(fields.fields()).unwrap_or(serde_json::Value::Null)
            }
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::PermissionDenied(msg) => serde_json::json!({ "message": msg }),
            // internals stay in the log
            ApiError::Internal(_) => serde_json::json!({ "message": "Internal server error" }),
        };

        if status.is_server_error() {
            error!(error = %error_msg, status = %status, "Request failed");
        } else {
            warn!(error = %error_msg, status = %status, details = %details, "Request rejected");
        }

        let error = match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            _ => error_msg,
        };
        HttpResponse::build(status).json(ErrorResponse { error, details })
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => ApiError::Validation(fields),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::PermissionDenied(msg) => ApiError::PermissionDenied(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => ApiError::from(domain),
            Err(other) => ApiError::Internal(other.to_string()),
        }
    }
}

/// Turns body decoding failures into the uniform 400 error.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let api_error = match &err {
        JsonPayloadError::Deserialize(e) => {
            ApiError::Validation(FieldErrors::single("non_field_errors", e.to_string()))
        }
        other => ApiError::BadRequest(other.to_string()),
    };
    api_error.into()
}

/// A path segment that is not a recipe id cannot name a record.
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    warn!(path = %req.path(), error = %err, "Unmatched path parameter");
    ApiError::NotFound("No Recipe matches the given query.".to_string()).into()
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
            })
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}
