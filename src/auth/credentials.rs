//! Registration and sign-in on top of a `CredentialStore`.
//!
//! The store only ever sees the bcrypt hash; hashing and comparison happen here.

use super::password::{hash_password, verify_password};
use super::SignUpRequest;
use crate::error::AppError;
use crate::models::NewUser;
use crate::repository::CredentialStore;

/// Creates the user and returns its id. A taken username fails with `Conflict`.
pub async fn register(store: &dyn CredentialStore, request: &SignUpRequest) -> Result<i32, AppError> {
    let password_hash = hash_password(&request.password)?;
    let id = store
        .create_user(NewUser {
            name: request.name.clone(),
            username: request.username.clone(),
            password_hash,
        })
        .await?;
    log::info!("registered user {} as id {}", request.username, id);
    Ok(id)
}

/// Returns the id of the user whose stored credential matches `password`.
///
/// Unknown usernames and wrong passwords fail the same way.
pub async fn verify(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<i32, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let credentials = store.find_by_username(username).await?.ok_or_else(invalid)?;
    if verify_password(password, &credentials.password_hash)? {
        Ok(credentials.id)
    } else {
        Err(invalid())
    }
}
