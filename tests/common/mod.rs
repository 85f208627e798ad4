#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};

use todo_lists::auth::{AuthResponse, TokenService};
use todo_lists::routes::IdResponse;

pub const TEST_SECRET: &str = "integration_test_secret";

pub fn tokens() -> TokenService {
    TokenService::new(TEST_SECRET, chrono::Duration::hours(1))
}

/// Builds the full application around `$store` the same way `main` does.
#[macro_export]
macro_rules! test_app {
    ($store:expr) => {{
        let tokens = $crate::common::tokens();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(
                    todo_lists::repository::Repository::new($store),
                ))
                .app_data(actix_web::web::Data::new(tokens.clone()))
                .wrap(actix_web::middleware::Logger::default())
                .service(todo_lists::routes::health::health)
                .configure(todo_lists::routes::auth_config)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(todo_lists::auth::AuthMiddleware::new(tokens))
                        .configure(todo_lists::routes::config),
                ),
        )
        .await
    }};
}

pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

/// Sends `req` and returns status and JSON body, also for errors raised by middleware.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let bytes = test::read_body(resp).await;
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let bytes = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }
    }
}

pub async fn register_and_sign_in<S, B>(app: &S, username: &str, password: &str) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/sign-up")
        .set_json(json!({
            "name": format!("{} name", username),
            "username": username,
            "password": password
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
    let created: IdResponse = serde_json::from_value(body).expect("sign-up response");

    let req = test::TestRequest::post()
        .uri("/auth/sign-in")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);
    let auth: AuthResponse = serde_json::from_value(body).expect("sign-in response");
    assert_eq!(auth.user_id, created.id);

    TestUser {
        id: auth.user_id,
        token: auth.token,
    }
}

pub async fn create_list<S, B>(app: &S, user: &TestUser, title: &str, description: &str) -> i32
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/lists")
        .insert_header(user.bearer())
        .set_json(json!({ "title": title, "description": description }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create list failed: {}", body);
    body["id"].as_i64().expect("list id") as i32
}

pub async fn create_item<S, B>(
    app: &S,
    user: &TestUser,
    list_id: i32,
    title: &str,
    description: &str,
) -> i32
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/lists/{}/items", list_id))
        .insert_header(user.bearer())
        .set_json(json!({ "title": title, "description": description }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create item failed: {}", body);
    body["id"].as_i64().expect("item id") as i32
}
