//! Fixed greetings, one per access level.

pub async fn hello() -> &'static str {
    "Hello"
}

pub async fn user() -> &'static str {
    "Hello User"
}

pub async fn admin() -> &'static str {
    "Hello Admin"
}
