use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;
use tracing::debug;

use rolegate_auth::{Requirement, authorize};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("authorization header is not valid ASCII")]
    NotAscii,

    #[error("authorization scheme is not Basic")]
    UnsupportedScheme,

    #[error("credentials are not valid base64 UTF-8")]
    Encoding,

    #[error("credentials must have the form username:password")]
    Format,
}

/// Username/password pair from an `Authorization: Basic` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Resolve the caller and enforce the access policy before routing.
///
/// Public routes skip credential checks entirely. Everywhere else a missing
/// or wrong credential is a 401 and a missing role a 403.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let requirement = services
        .policy
        .requirement_for(req.method().as_str(), req.uri().path());
    if *requirement == Requirement::Public {
        return next.run(req).await;
    }

    let principal = match extract_basic(req.headers()) {
        Ok(Some(creds)) => {
            match services
                .accounts
                .authenticate(&creds.username, &creds.password)
                .await
            {
                Ok(principal) => principal,
                Err(e) => return errors::account_error_to_response(e),
            }
        }
        Ok(None) => None,
        Err(e) => {
            debug!(error = %e, "ignoring malformed credentials");
            None
        }
    };

    if let Err(e) = authorize(principal.as_ref(), requirement) {
        return errors::authz_error_to_response(e);
    }

    if let Some(principal) = principal {
        req.extensions_mut().insert(PrincipalContext::new(principal));
    }

    next.run(req).await
}

/// `Ok(None)` when no `Authorization` header is present.
pub fn extract_basic(headers: &HeaderMap) -> Result<Option<BasicCredentials>, CredentialsError> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| CredentialsError::NotAscii)?;
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or(CredentialsError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(CredentialsError::UnsupportedScheme);
    }

    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| CredentialsError::Encoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| CredentialsError::Encoding)?;

    let (username, password) = decoded.split_once(':').ok_or(CredentialsError::Format)?;
    Ok(Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn basic(raw: &str) -> HeaderMap {
        headers(&format!("Basic {}", BASE64.encode(raw)))
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_basic(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn decodes_username_and_password() {
        let creds = extract_basic(&basic("alice:pw1")).unwrap().unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw1");
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = extract_basic(&basic("alice:a:b:c")).unwrap().unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let value = format!("basic {}", BASE64.encode("bob:pw"));
        assert!(extract_basic(&headers(&value)).unwrap().is_some());
    }

    #[test]
    fn bearer_tokens_are_rejected() {
        assert_eq!(
            extract_basic(&headers("Bearer abc.def.ghi")),
            Err(CredentialsError::UnsupportedScheme)
        );
    }

    #[test]
    fn garbage_payloads_are_rejected() {
        assert_eq!(
            extract_basic(&headers("Basic !!!")),
            Err(CredentialsError::Encoding)
        );
        assert_eq!(extract_basic(&basic("no-colon")), Err(CredentialsError::Format));
    }

    #[test]
    fn debug_output_hides_the_password() {
        let creds = extract_basic(&basic("alice:hunter2")).unwrap().unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
