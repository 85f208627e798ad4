use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{TodoListInput, UpdateListInput},
    repository::Repository,
    routes::{DataResponse, IdResponse, StatusResponse},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Creates a list owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: `{"id": <list id>}`.
/// - `422 Unprocessable Entity`: Title or description fails validation.
#[post("")]
pub async fn create_list(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    list_data: web::Json<TodoListInput>,
) -> Result<impl Responder, AppError> {
    list_data.validate()?;

    let id = repo.lists.create(user.0, &list_data).await?;

    Ok(HttpResponse::Created().json(IdResponse { id }))
}

/// Returns every list the authenticated user owns as `{"data": [...]}`.
#[get("")]
pub async fn get_all_lists(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let lists = repo.lists.get_all(user.0).await?;

    Ok(HttpResponse::Ok().json(DataResponse { data: lists }))
}

/// Returns one list, or `404 Not Found` if the user does not own it.
#[get("/{id}")]
pub async fn get_list(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    list_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let list = repo.lists.get_by_id(user.0, list_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(list))
}

/// Applies a partial update to a list.
///
/// ## Responses:
/// - `200 OK`: `{"status": "ok"}`.
/// - `404 Not Found`: No list with this id is owned by the user.
/// - `422 Unprocessable Entity`: No field was given, or a field fails validation.
#[put("/{id}")]
pub async fn update_list(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    list_id: web::Path<i32>,
    update_data: web::Json<UpdateListInput>,
) -> Result<impl Responder, AppError> {
    update_data.validate()?;

    let rows = repo
        .lists
        .update(user.0, list_id.into_inner(), &update_data)
        .await?;
    if rows == 0 {
        return Err(AppError::NotFound("list not found".into()));
    }

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

/// Deletes a list the user owns.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: No list with this id is owned by the user.
#[delete("/{id}")]
pub async fn delete_list(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    list_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let rows = repo.lists.delete(user.0, list_id.into_inner()).await?;
    if rows == 0 {
        return Err(AppError::NotFound("list not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
