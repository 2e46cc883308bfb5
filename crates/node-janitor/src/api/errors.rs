use core::error::Error;

use poem::error::ResponseError;
use poem::http::StatusCode;

use crate::janitor::JanitorError;

/// API errors
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    #[display("Server error: {message}")]
    ServerError { message: String },
    #[display("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },
    #[display("Missing authorization header")]
    MissingAuthHeader,
}

impl Error for ApiError {}

impl ResponseError for ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AuthenticationFailed { .. } | Self::MissingAuthHeader => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

/// Status code reported to the caller for a failed self-destruct.
pub fn janitor_error_status(err: &JanitorError) -> StatusCode {
    match err {
        JanitorError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        JanitorError::MissingNodeName | JanitorError::Kubernetes(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::KubernetesError;

    #[test]
    fn api_error_display_formatting() {
        let server_error = ApiError::ServerError {
            message: "bind failed".to_string(),
        };
        assert_eq!(server_error.to_string(), "Server error: bind failed");

        let auth_failed = ApiError::AuthenticationFailed {
            reason: "token mismatch".to_string(),
        };
        assert_eq!(
            auth_failed.to_string(),
            "Authentication failed: token mismatch"
        );

        assert_eq!(
            ApiError::MissingAuthHeader.to_string(),
            "Missing authorization header"
        );
    }

    #[test]
    fn janitor_errors_map_to_status_codes() {
        assert_eq!(
            janitor_error_status(&JanitorError::MissingNodeName),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            janitor_error_status(&JanitorError::Timeout {
                node_name: "worker-7".to_string(),
                timeout_secs: 30,
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            janitor_error_status(&JanitorError::Kubernetes(KubernetesError::NodeNotFound {
                node_name: "worker-7".to_string(),
                message: "not found".to_string(),
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        let err: poem::Error = ApiError::MissingAuthHeader.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
