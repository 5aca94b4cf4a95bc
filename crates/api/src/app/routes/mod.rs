use axum::{
    routing::{get, post},
    Router,
};

pub mod admin;
pub mod greet;
pub mod system;
pub mod users;

/// Router for every endpoint; access control is applied by the caller.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/hello", get(greet::hello))
        .route("/api/user", get(greet::user))
        .route("/api/admin", get(greet::admin))
        .route("/api/addUser", post(users::add_user))
        .route("/api/admin/:id", post(admin::promote_user))
}
