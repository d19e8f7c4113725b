//! Request authorization for protected routes.
//!
//! A request passes three steps in order: a bearer token must be present,
//! the token must verify, and the verified email must equal the `email`
//! query parameter. The first failing step decides the response.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Request, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{IdentityVerifier, VerifiedIdentity};
use crate::metrics;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No usable bearer token
    Unauthenticated,
    /// Token failed verification, or the identity may not see this resource
    Forbidden,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Rejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized access"),
            Rejection::Forbidden => (StatusCode::FORBIDDEN, "Forbidden access"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// The `email` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Email of the applicant whose data the request may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantEmail(pub String);

/// Step 1: the token from `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, Rejection> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
        .ok_or(Rejection::Unauthenticated)
}

/// Step 2: verify the token with the identity provider.
pub async fn verify(verifier: &dyn IdentityVerifier, token: &str) -> Result<VerifiedIdentity, Rejection> {
    verifier.verify(token).await.map_err(|e| {
        warn!("Token rejected: {}", e);
        Rejection::Forbidden
    })
}

/// Step 3: the verified email must equal the `email` query parameter exactly.
pub fn match_email(identity: &VerifiedIdentity, uri: &Uri) -> Result<ApplicantEmail, Rejection> {
    let requested = Query::<EmailQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.email);

    match (identity.email.as_deref(), requested) {
        (Some(verified), Some(requested)) if verified == requested => Ok(ApplicantEmail(requested)),
        _ => {
            debug!(uid = %identity.uid, "Verified email does not match requested email");
            Err(Rejection::Forbidden)
        }
    }
}

/// Run every step against one request.
pub async fn authorize_applicant(
    verifier: &dyn IdentityVerifier,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<(VerifiedIdentity, ApplicantEmail), Rejection> {
    let token = extract_bearer(headers)?;
    let identity = verify(verifier, token).await?;
    let email = match_email(&identity, uri)?;
    Ok((identity, email))
}

/// Middleware guarding routes that return one applicant's data.
///
/// On success the handler finds `VerifiedIdentity` and `ApplicantEmail` in
/// the request extensions.
pub async fn require_applicant(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authorize_applicant(state.verifier.as_ref(), request.headers(), request.uri()).await {
        Ok((identity, email)) => {
            request.extensions_mut().insert(identity);
            request.extensions_mut().insert(email);
            next.run(request).await
        }
        Err(rejection) => {
            let response = rejection.into_response();
            metrics::record_auth_rejection(response.status().as_u16());
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn identity(email: Option<&str>) -> VerifiedIdentity {
        VerifiedIdentity {
            uid: "uid-1".to_string(),
            email: email.map(str::to_string),
            email_verified: true,
        }
    }

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), Err(Rejection::Unauthenticated));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), Err(Rejection::Unauthenticated));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(extract_bearer(&headers), Err(Rejection::Unauthenticated));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer(&headers), Err(Rejection::Unauthenticated));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_bearer(&headers), Ok("abc"));
    }

    #[test]
    fn test_match_email_exact() {
        let uri: Uri = "/applications?email=a%40x.com".parse().unwrap();
        assert_eq!(
            match_email(&identity(Some("a@x.com")), &uri),
            Ok(ApplicantEmail("a@x.com".to_string()))
        );
    }

    #[test]
    fn test_match_email_is_case_sensitive() {
        let uri: Uri = "/applications?email=A@x.com".parse().unwrap();
        assert_eq!(match_email(&identity(Some("a@x.com")), &uri), Err(Rejection::Forbidden));
    }

    #[test]
    fn test_match_email_requires_parameter_and_claim() {
        let no_param: Uri = "/applications".parse().unwrap();
        assert_eq!(match_email(&identity(Some("a@x.com")), &no_param), Err(Rejection::Forbidden));

        let with_param: Uri = "/applications?email=a@x.com".parse().unwrap();
        assert_eq!(match_email(&identity(None), &with_param), Err(Rejection::Forbidden));
    }

    #[test]
    fn test_only_email_parameter_counts() {
        let uri: Uri = "/applications?applicant=a@x.com&mail=a@x.com".parse().unwrap();
        assert_eq!(match_email(&identity(Some("a@x.com")), &uri), Err(Rejection::Forbidden));
    }
}
