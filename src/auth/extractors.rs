use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The authenticated principal of a request.
///
/// `AuthMiddleware` inserts it into the request extensions. A handler that extracts it
/// on a route the middleware does not cover is a wiring bug, so a missing principal is
/// reported as `AppError::InternalServerError` rather than `Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => {
                log::error!("no authenticated user on {}, is AuthMiddleware applied?", req.path());
                let err = AppError::InternalServerError("user id not found".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
