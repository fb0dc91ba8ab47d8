//! Teacher record handlers.
//!
//! ```text
//! GET  /api/v1/teachers
//! POST /api/v1/teachers
//! GET  /api/v1/teachers/{id}
//! PUT  /api/v1/teachers/{id}
//! GET  /api/v1/teachers/number/{teacherId}
//! ```

use actix_web::{HttpResponse, get, post, put, web};

use super::ApiResult;
use super::dto::{TeacherDto, TeacherRequest};
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::rejected;
use crate::domain::ports::{TeacherRecord, TeacherUpdate};
use crate::domain::{Error, TeacherNumber, UserId};

fn record_view(record: &TeacherRecord) -> Result<TeacherDto, Error> {
    TeacherDto::new(&record.user, Some(&record.assigned_courses))
}

#[utoipa::path(
    get,
    path = "/api/v1/teachers",
    responses(
        (status = 200, description = "All teachers", body = [TeacherDto]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["teachers"],
    operation_id = "listTeachers"
)]
#[get("/teachers")]
pub async fn list_teachers(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TeacherDto>>> {
    let caller = session.require_caller()?;
    let teachers = state.teachers.list_teachers(&caller).await?;
    let views = teachers
        .iter()
        .map(|user| TeacherDto::new(user, None))
        .collect::<Result<_, _>>()?;
    Ok(web::Json(views))
}

#[utoipa::path(
    post,
    path = "/api/v1/teachers",
    request_body = TeacherRequest,
    responses(
        (status = 201, description = "Registered", body = TeacherDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Email or teacher id taken", body = Error)
    ),
    tags = ["teachers"],
    operation_id = "registerTeacher"
)]
#[post("/teachers")]
pub async fn register_teacher(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TeacherRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let registration = payload.into_inner().into_registration()?;
    let user = state.teachers.register_teacher(&caller, registration).await?;
    Ok(HttpResponse::Created().json(TeacherDto::new(&user, Some(&[]))?))
}

#[utoipa::path(
    get,
    path = "/api/v1/teachers/number/{teacherId}",
    params(("teacherId" = String, Path, description = "Public teacher number")),
    responses(
        (status = 200, description = "Teacher", body = TeacherDto),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such teacher", body = Error)
    ),
    tags = ["teachers"],
    operation_id = "getTeacherByNumber"
)]
#[get("/teachers/number/{teacher_id}")]
pub async fn get_teacher_by_number(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TeacherDto>> {
    let caller = session.require_caller()?;
    let number = TeacherNumber::new(path.into_inner()).map_err(rejected)?;
    let record = state.teachers.get_teacher_by_number(&caller, &number).await?;
    Ok(web::Json(record_view(&record)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/teachers/{id}",
    params(("id" = i64, Path, description = "Teacher user id")),
    responses(
        (status = 200, description = "Teacher with assigned courses", body = TeacherDto),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such teacher", body = Error)
    ),
    tags = ["teachers"],
    operation_id = "getTeacher"
)]
#[get("/teachers/{id}")]
pub async fn get_teacher(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TeacherDto>> {
    let caller = session.require_caller()?;
    let record = state
        .teachers
        .get_teacher(&caller, UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(record_view(&record)?))
}

#[utoipa::path(
    put,
    path = "/api/v1/teachers/{id}",
    params(("id" = i64, Path, description = "Teacher user id")),
    request_body = TeacherRequest,
    responses(
        (status = 200, description = "Updated teacher", body = TeacherDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such teacher", body = Error),
        (status = 409, description = "Teacher id taken", body = Error)
    ),
    tags = ["teachers"],
    operation_id = "updateTeacher"
)]
#[put("/teachers/{id}")]
pub async fn update_teacher(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<TeacherRequest>,
) -> ApiResult<web::Json<TeacherDto>> {
    let caller = session.require_caller()?;
    let (name, profile) = payload.into_inner().into_update()?;
    let record = state
        .teachers
        .update_teacher(
            &caller,
            UserId::new(path.into_inner()),
            TeacherUpdate { name, profile },
        )
        .await?;
    Ok(web::Json(record_view(&record)?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{
        ADMIN_EMAIL, ADMIN_PASSWORD, MEMBER_PASSWORD, api_app, login, member_email, memory_app,
    };

    #[rstest]
    #[actix_web::test]
    async fn teacher_lookup_lists_assigned_courses() {
        let fixture = memory_app().await;
        let teacher = fixture.teacher("T1004").await;
        fixture.course("CS101", "T1004").await;
        let app = test::init_service(api_app(fixture.state.clone())).await;
        let cookie = login!(&app, &member_email("T1004"), MEMBER_PASSWORD);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/teachers/{}", teacher.id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["teacherId"], "T1004");
        assert_eq!(body["assignedCourses"][0]["code"], "CS101");
    }

    #[rstest]
    #[actix_web::test]
    async fn students_cannot_read_teacher_records() {
        let fixture = memory_app().await;
        fixture.teacher("T1004").await;
        fixture.student("S0042").await;
        let app = test::init_service(api_app(fixture.state.clone())).await;
        let cookie = login!(&app, &member_email("S0042"), MEMBER_PASSWORD);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/teachers/number/T1004")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn renumbering_a_teacher_shows_on_their_courses() {
        let fixture = memory_app().await;
        let teacher = fixture.teacher("T1004").await;
        let course = fixture.course("CS101", "T1004").await;
        let app = test::init_service(api_app(fixture.state.clone())).await;
        let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/teachers/{}", teacher.id()))
                .cookie(admin.clone())
                .set_json(json!({
                    "firstName": "Ada",
                    "lastName": "Byron",
                    "teacherId": "T2000",
                    "department": "Mathematics"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/courses/{}", course.id.get()))
                .cookie(admin)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["teacherId"], "T2000");
    }
}
