use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Resolves an `Authorization` header value of the form `<scheme> <token>` to a user id.
///
/// Fails with `Unauthorized` when the header is absent or empty, does not split into
/// exactly two whitespace separated parts, or carries a token that does not verify.
pub fn authenticate(header: Option<&str>, tokens: &TokenService) -> Result<i32, AppError> {
    let header = match header.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AppError::Unauthorized("empty auth header".into())),
    };

    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(AppError::Unauthorized("invalid auth header".into()));
    }

    tokens.parse_token(parts[1])
}

/// Authenticates every request in the wrapped scope and stores the principal
/// as an `AuthenticatedUserId` request extension.
pub struct AuthMiddleware {
    tokens: TokenService,
}

impl AuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // A header that is not valid UTF-8 is treated like a missing one.
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match authenticate(auth_header, &self.tokens) {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUserId(user_id));
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("rejected request to {}: {}", req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
