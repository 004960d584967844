//! Shared HTTP response types.

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::application::{Directive, Flash, Payload, View};
use crate::domain::{DomainError, FieldErrors, SessionGrant};

/// Standard API response wrapper
///
/// Errors return `{"success": false, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` if the request succeeded
    pub success: bool,
    /// Payload. `null` on error
    pub data: Option<T>,
    /// Error description. `null` on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────

/// `DomainError` rendered at the HTTP edge.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::ParameterMissing(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) | DomainError::AlreadyInitialized => StatusCode::CONFLICT,
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

// ── Directives ──────────────────────────────────────────────────

/// Body of a `303 See Other` answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectBody {
    pub redirect_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
    /// Bearer token issued when the request signed an account in
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub session: Option<SessionGrant>,
}

/// Body of a `422` form re-render.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvalidBody {
    pub view: View,
    /// Submitted values, passwords omitted
    #[schema(value_type = Object)]
    pub form: Payload,
    /// Messages keyed by field name
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize)]
struct RenderBody {
    view: View,
    #[serde(flatten)]
    payload: Payload,
}

/// Presents a [`Directive`] as an HTTP response.
pub struct DirectiveResponse(pub Directive);

impl From<Directive> for DirectiveResponse {
    fn from(directive: Directive) -> Self {
        Self(directive)
    }
}

impl IntoResponse for DirectiveResponse {
    fn into_response(self) -> Response {
        match self.0 {
            Directive::Render { view, payload } => {
                (StatusCode::OK, Json(RenderBody { view, payload })).into_response()
            }
            Directive::Invalid { view, form, errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(InvalidBody { view, form, errors }),
            )
                .into_response(),
            Directive::Redirect {
                location,
                flash,
                session,
            } => {
                let location_header = HeaderValue::from_str(&location);
                let mut response = (
                    StatusCode::SEE_OTHER,
                    Json(RedirectBody {
                        redirect_to: location,
                        flash,
                        session,
                    }),
                )
                    .into_response();
                if let Ok(value) = location_header {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                response
            }
        }
    }
}
