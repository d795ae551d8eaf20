use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use warden_auth_types::gate::GateError;
use warden_core::context::ContextError;

/// Authorization service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("user not found")]
    UserNotFound,
    #[error("role not found")]
    RoleNotFound,
    #[error("permission not found")]
    PermissionNotFound,
    #[error("user role not found")]
    UserRoleNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid reset token")]
    InvalidResetToken,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthzError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::PermissionNotFound => "PERMISSION_NOT_FOUND",
            Self::UserRoleNotFound => "USER_ROLE_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<ContextError> for AuthzError {
    fn from(_: ContextError) -> Self {
        Self::Cancelled
    }
}

impl From<GateError> for AuthzError {
    fn from(_: GateError) -> Self {
        Self::Unauthorized
    }
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound
            | Self::RoleNotFound
            | Self::PermissionNotFound
            | Self::UserRoleNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidCredentials | Self::InvalidResetToken => StatusCode::BAD_REQUEST,
            Self::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only internal errors are logged here, with the full cause chain.
        // The caller sees the fixed message.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
