use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use rolegate_auth::RoleName;
use rolegate_core::UserId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// POST /api/admin/:id - grant `ADMIN` to an existing account
pub async fn promote_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    // The policy already guards this route; checked again at the operation.
    if let Err(e) = principal.require_role(&RoleName::ADMIN) {
        return errors::authz_error_to_response(e);
    }

    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()),
    };

    match services.accounts.promote_to_admin(user_id).await {
        Ok(user) => {
            tracing::info!(
                %user_id,
                promoted_by = %principal.user_id(),
                by_username = principal.username(),
                "promoted user to admin"
            );
            (StatusCode::ACCEPTED, Json(dto::UserResponse::from(&user))).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}
