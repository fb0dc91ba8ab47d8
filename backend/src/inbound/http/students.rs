//! Student record handlers.
//!
//! ```text
//! GET  /api/v1/students
//! POST /api/v1/students
//! GET  /api/v1/students/{id}
//! PUT  /api/v1/students/{id}
//! GET  /api/v1/students/number/{studentId}
//! GET  /api/v1/students/{id}/courses
//! ```

use actix_web::{HttpResponse, get, post, put, web};

use super::ApiResult;
use super::dto::{CourseDto, StudentDto, StudentRequest, course_list};
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::rejected;
use crate::domain::ports::{StudentRecord, StudentUpdate};
use crate::domain::{Error, StudentNumber, UserId};

fn record_view(record: &StudentRecord) -> Result<StudentDto, Error> {
    StudentDto::new(&record.user, Some(&record.enrolled_courses))
}

#[utoipa::path(
    get,
    path = "/api/v1/students",
    responses(
        (status = 200, description = "All students", body = [StudentDto]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["students"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<StudentDto>>> {
    let caller = session.require_caller()?;
    let students = state.students.list_students(&caller).await?;
    let views = students
        .iter()
        .map(|user| StudentDto::new(user, None))
        .collect::<Result<_, _>>()?;
    Ok(web::Json(views))
}

/// Create a student account on behalf of an administrator.
#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = StudentRequest,
    responses(
        (status = 201, description = "Created", body = StudentDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Email or student id taken", body = Error)
    ),
    tags = ["students"],
    operation_id = "createStudent"
)]
#[post("/students")]
pub async fn create_student(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StudentRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let registration = payload.into_inner().into_registration()?;
    let user = state.students.register_student(&caller, registration).await?;
    Ok(HttpResponse::Created().json(StudentDto::new(&user, Some(&[]))?))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/number/{studentId}",
    params(("studentId" = String, Path, description = "Public student number")),
    responses(
        (status = 200, description = "Student", body = StudentDto),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such student", body = Error)
    ),
    tags = ["students"],
    operation_id = "getStudentByNumber"
)]
#[get("/students/number/{student_id}")]
pub async fn get_student_by_number(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<StudentDto>> {
    let caller = session.require_caller()?;
    let number = StudentNumber::new(path.into_inner()).map_err(rejected)?;
    let record = state.students.get_student_by_number(&caller, &number).await?;
    Ok(web::Json(record_view(&record)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(("id" = i64, Path, description = "Student user id")),
    responses(
        (status = 200, description = "Student with enrolled courses", body = StudentDto),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such student", body = Error)
    ),
    tags = ["students"],
    operation_id = "getStudent"
)]
#[get("/students/{id}")]
pub async fn get_student(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<StudentDto>> {
    let caller = session.require_caller()?;
    let record = state
        .students
        .get_student(&caller, UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(record_view(&record)?))
}

/// Replace the name and student fields. Students may update only themselves.
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    params(("id" = i64, Path, description = "Student user id")),
    request_body = StudentRequest,
    responses(
        (status = 200, description = "Updated student", body = StudentDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such student", body = Error),
        (status = 409, description = "Student id taken", body = Error)
    ),
    tags = ["students"],
    operation_id = "updateStudent"
)]
#[put("/students/{id}")]
pub async fn update_student(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<StudentRequest>,
) -> ApiResult<web::Json<StudentDto>> {
    let caller = session.require_caller()?;
    let (name, profile) = payload.into_inner().into_update()?;
    let record = state
        .students
        .update_student(
            &caller,
            UserId::new(path.into_inner()),
            StudentUpdate { name, profile },
        )
        .await?;
    Ok(web::Json(record_view(&record)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/courses",
    params(("id" = i64, Path, description = "Student user id")),
    responses(
        (status = 200, description = "Enrolled courses", body = [CourseDto]),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such student", body = Error)
    ),
    tags = ["students"],
    operation_id = "getStudentCourses"
)]
#[get("/students/{id}/courses")]
pub async fn student_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<CourseDto>>> {
    let caller = session.require_caller()?;
    let courses = state
        .students
        .student_courses(&caller, UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(course_list(&courses)))
}
