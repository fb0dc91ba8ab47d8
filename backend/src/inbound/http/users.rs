//! Account administration handlers.
//!
//! ```text
//! GET /api/v1/users
//! PUT /api/v1/users/{id}/status {"status":"SUSPENDED"}
//! ```

use actix_web::{get, put, web};

use super::ApiResult;
use super::dto::{StatusRequest, UserDto};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{Error, UserId};

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserDto>>> {
    let caller = session.require_caller()?;
    let users = state.users.list_users(&caller).await?;
    Ok(web::Json(users.iter().map(UserDto::from).collect()))
}

/// Set an account's status. Suspended accounts can no longer log in.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/status",
    params(("id" = i64, Path, description = "User id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUserStatus"
)]
#[put("/users/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<UserDto>> {
    let caller = session.require_caller()?;
    let status = payload.into_inner().into_status()?;
    let user = state
        .users
        .update_status(&caller, UserId::new(path.into_inner()), status)
        .await?;
    Ok(web::Json(UserDto::from(&user)))
}
