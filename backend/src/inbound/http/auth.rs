//! Authentication handlers.
//!
//! ```text
//! POST /api/v1/auth/login {"email":"admin@campus.test","password":"..."}
//! POST /api/v1/auth/logout
//! POST /api/v1/auth/register/student
//! ```

use actix_web::{HttpResponse, post, web};

use super::ApiResult;
use super::dto::{LoginRequest, SessionUserDto, StudentDto, StudentRequest};
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::rejected_login;
use crate::domain::{Error, LoginCredentials};

/// Verify credentials and store the caller in the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionUserDto,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionUserDto>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(rejected_login)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_caller(&user)?;
    Ok(web::Json(SessionUserDto::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Public student sign-up; the new account starts ACTIVE.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/student",
    request_body = StudentRequest,
    responses(
        (status = 201, description = "Registered", body = StudentDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or student id taken", body = Error)
    ),
    tags = ["auth"],
    operation_id = "registerStudent",
    security([])
)]
#[post("/auth/register/student")]
pub async fn register_student(
    state: web::Data<HttpState>,
    payload: web::Json<StudentRequest>,
) -> ApiResult<HttpResponse> {
    let registration = payload.into_inner().into_registration()?;
    let user = state.students.self_register_student(registration).await?;
    Ok(HttpResponse::Created().json(StudentDto::new(&user, Some(&[]))?))
}
