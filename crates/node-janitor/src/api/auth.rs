use std::sync::Arc;

use poem::Endpoint;
use poem::Middleware;
use poem::Request;
use poem::Result as PoemResult;
use tracing::warn;

use super::errors::ApiError;

/// Shared-secret settings for the self-destruct endpoint.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token. `None` leaves the endpoint open.
    pub token: Option<String>,
}

/// Bearer token authentication middleware
pub struct BearerAuthMiddleware {
    config: AuthConfig,
}

impl BearerAuthMiddleware {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

/// Compares in time independent of where the first mismatch is.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    if expected.len() != provided.len() {
        return false;
    }
    expected
        .iter()
        .zip(provided)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Checks the `Authorization` header against `expected`.
fn authorize(expected: &str, header: Option<&str>) -> Result<(), ApiError> {
    let header = header.ok_or(ApiError::MissingAuthHeader)?;

    let token = match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            return Err(ApiError::AuthenticationFailed {
                reason: "Invalid authorization header format".to_string(),
            })
        }
    };

    if tokens_match(expected, token.trim()) {
        Ok(())
    } else {
        Err(ApiError::AuthenticationFailed {
            reason: "Invalid token".to_string(),
        })
    }
}

impl<E> Middleware<E> for BearerAuthMiddleware
where E: Endpoint
{
    type Output = BearerAuthEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        BearerAuthEndpoint {
            inner: ep,
            token: self.config.token.clone().map(Arc::from),
        }
    }
}

pub struct BearerAuthEndpoint<E> {
    inner: E,
    token: Option<Arc<str>>,
}

impl<E> Endpoint for BearerAuthEndpoint<E>
where E: Endpoint
{
    type Output = E::Output;

    async fn call(&self, req: Request) -> PoemResult<Self::Output> {
        if let Some(expected) = &self.token {
            let header = req
                .headers()
                .get("authorization")
                .and_then(|h| h.to_str().ok());

            if let Err(e) = authorize(expected, header) {
                warn!(remote_addr = %req.remote_addr(), "Rejected self-destruct request: {e}");
                return Err(e.into());
            }
        }

        self.inner.call(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_bearer_token() {
        assert!(authorize("s3cret", Some("Bearer s3cret")).is_ok());
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(authorize("s3cret", Some("bearer s3cret")).is_ok());
        assert!(authorize("s3cret", Some("BEARER s3cret")).is_ok());
    }

    #[test]
    fn rejects_missing_header() {
        let err = authorize("s3cret", None).expect_err("missing header should fail");
        assert!(matches!(err, ApiError::MissingAuthHeader));
    }

    #[test]
    fn rejects_wrong_scheme_and_wrong_token() {
        let err = authorize("s3cret", Some("Basic s3cret")).expect_err("basic auth is not accepted");
        assert!(err.to_string().contains("Invalid authorization header format"));

        let err = authorize("s3cret", Some("Bearer s3cres")).expect_err("wrong token");
        assert!(err.to_string().contains("Invalid token"));

        let err = authorize("s3cret", Some("Bearer s3cret-longer")).expect_err("length differs");
        assert!(err.to_string().contains("Invalid token"));
    }
}
