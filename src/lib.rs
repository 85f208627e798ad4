#![doc = "The `todo_lists` library crate."]
#![doc = ""]
#![doc = "Users own todo lists and lists own items. Every read and write of a list or item"]
#![doc = "goes through the ownership relations in `repository`, keyed by the principal that"]
#![doc = "`auth::AuthMiddleware` attaches to each request. The binary (`main.rs`) wires the"]
#![doc = "PostgreSQL store, the token service and the routes into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

pub use crate::error::AppError;
pub use crate::repository::Repository;
