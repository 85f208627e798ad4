pub mod auth;
pub mod health;
pub mod items;
pub mod lists;

use actix_web::web;
use serde::{Deserialize, Serialize};

/// Body of a successful create: the new entity's id.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i32,
}

/// Body of a collection read.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Body of a successful update.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Public routes, mounted outside the authenticated scope.
pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::sign_up)
            .service(auth::sign_in),
    );
}

/// Routes that require `AuthMiddleware` on the enclosing scope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lists")
            .service(lists::create_list)
            .service(lists::get_all_lists)
            .service(lists::get_list)
            .service(lists::update_list)
            .service(lists::delete_list)
            .service(items::create_item)
            .service(items::get_all_items),
    )
    .service(
        web::scope("/items")
            .service(items::get_item)
            .service(items::update_item)
            .service(items::delete_item),
    );
}
