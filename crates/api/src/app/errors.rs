use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use rolegate_auth::AuthzError;
use rolegate_infra::AccountError;

const BASIC_CHALLENGE: &str = r#"Basic realm="rolegate", charset="UTF-8""#;

pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AccountError::NotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("user {id} not found"))
        }
        AccountError::UsernameTaken(name) => json_error(
            StatusCode::CONFLICT,
            "username_taken",
            format!("username '{name}' is already taken"),
        ),
        AccountError::Hashing(e) => {
            error!(error = %e, "credential hashing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "hashing_error", "internal error")
        }
        AccountError::Store(e) => {
            error!(error = %e, "store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal error")
        }
    }
}

/// 401 carries a Basic challenge so clients know how to authenticate.
pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            let mut res = json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string());
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static(BASIC_CHALLENGE),
            );
            res
        }
        AuthzError::MissingRole(_) => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
