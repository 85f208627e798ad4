use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{TodoItemInput, UpdateItemInput},
    repository::Repository,
    routes::{DataResponse, IdResponse, StatusResponse},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Creates an item in one of the user's lists.
///
/// The list is looked up through the user's ownership first, so adding to somebody
/// else's list answers `404 Not Found` like a missing list.
///
/// ## Responses:
/// - `201 Created`: `{"id": <item id>}`.
/// - `404 Not Found`: The list does not exist or is not owned by the user.
/// - `422 Unprocessable Entity`: Title or description fails validation.
#[post("/{id}/items")]
pub async fn create_item(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    list_id: web::Path<i32>,
    item_data: web::Json<TodoItemInput>,
) -> Result<impl Responder, AppError> {
    item_data.validate()?;

    let list = repo.lists.get_by_id(user.0, list_id.into_inner()).await?;
    let id = repo.items.create(list.id, &item_data).await?;

    Ok(HttpResponse::Created().json(IdResponse { id }))
}

/// Returns the items of one of the user's lists as `{"data": [...]}`.
#[get("/{id}/items")]
pub async fn get_all_items(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    list_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let items = repo.items.get_all(user.0, list_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(DataResponse { data: items }))
}

#[get("/{id}")]
pub async fn get_item(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    item_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let item = repo.items.get_by_id(user.0, item_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(item))
}

/// Applies a partial update (title, description, done) to an item.
#[put("/{id}")]
pub async fn update_item(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    item_id: web::Path<i32>,
    update_data: web::Json<UpdateItemInput>,
) -> Result<impl Responder, AppError> {
    update_data.validate()?;

    let rows = repo
        .items
        .update(user.0, item_id.into_inner(), &update_data)
        .await?;
    if rows == 0 {
        return Err(AppError::NotFound("item not found".into()));
    }

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

#[delete("/{id}")]
pub async fn delete_item(
    repo: web::Data<Repository>,
    user: AuthenticatedUserId,
    item_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let rows = repo.items.delete(user.0, item_id.into_inner()).await?;
    if rows == 0 {
        return Err(AppError::NotFound("item not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
