use crate::{
    auth::{credentials, AuthResponse, SignInRequest, SignUpRequest, TokenService},
    error::AppError,
    repository::Repository,
    routes::IdResponse,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a user account and returns its id.
///
/// ## Responses:
/// - `201 Created`: `{"id": <user id>}`.
/// - `400 Bad Request`: Malformed JSON or missing fields.
/// - `409 Conflict`: The username is taken.
/// - `422 Unprocessable Entity`: Field validation failed.
#[post("/sign-up")]
pub async fn sign_up(
    repo: web::Data<Repository>,
    sign_up_data: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    sign_up_data.validate()?;

    let id = credentials::register(repo.credentials.as_ref(), &sign_up_data).await?;

    Ok(HttpResponse::Created().json(IdResponse { id }))
}

/// Sign in
///
/// Checks the username and password and returns a token for the `/api` routes.
///
/// ## Responses:
/// - `200 OK`: An `AuthResponse`.
/// - `401 Unauthorized`: Unknown username or wrong password.
#[post("/sign-in")]
pub async fn sign_in(
    repo: web::Data<Repository>,
    tokens: web::Data<TokenService>,
    sign_in_data: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    sign_in_data.validate()?;

    let user_id = credentials::verify(
        repo.credentials.as_ref(),
        &sign_in_data.username,
        &sign_in_data.password,
    )
    .await?;
    let token = tokens.generate_token(user_id)?;

    Ok(HttpResponse::Ok().json(AuthResponse { token, user_id }))
}
