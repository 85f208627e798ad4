use sqlx::FromRow;

/// A user row about to be inserted. `password_hash` is already transformed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

/// The stored credential for a username, used for sign-in.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub password_hash: String,
}
