//! Course catalog and enrollment handlers.
//!
//! ```text
//! GET|POST       /api/v1/courses
//! GET|PUT|DELETE /api/v1/courses/{id}
//! GET            /api/v1/courses/code/{code}
//! GET            /api/v1/courses/teacher/{teacherId}
//! GET|POST       /api/v1/courses/{id}/assignments
//! GET            /api/v1/courses/{id}/students
//! POST|DELETE    /api/v1/courses/{id}/students/{studentId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use super::ApiResult;
use super::dto::{AssignmentDto, AssignmentRequest, CourseDto, CourseRequest, StudentDto, course_list};
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::rejected;
use crate::domain::ports::CourseForm;
use crate::domain::{AssignmentDraft, CourseCode, CourseId, Error, UserId};

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "All courses with schedules", body = [CourseDto]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseDto>>> {
    let caller = session.require_caller()?;
    let courses = state.courses.list_courses(&caller).await?;
    Ok(web::Json(course_list(&courses)))
}

/// Create a course and its schedules in one step.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Created", body = CourseDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown teacher", body = Error),
        (status = 409, description = "Course code taken", body = Error),
        (status = 503, description = "Rolled back", body = Error)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let form = CourseForm::try_from(payload.into_inner())?;
    let course = state.courses.create_course(&caller, form).await?;
    Ok(HttpResponse::Created().json(CourseDto::from(&course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/code/{code}",
    params(("code" = String, Path, description = "Course code such as CS101")),
    responses(
        (status = 200, description = "Course", body = CourseDto),
        (status = 404, description = "No such course", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getCourseByCode"
)]
#[get("/courses/code/{code}")]
pub async fn get_course_by_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseDto>> {
    let caller = session.require_caller()?;
    let code = CourseCode::new(path.into_inner()).map_err(rejected)?;
    let course = state.courses.get_course_by_code(&caller, &code).await?;
    Ok(web::Json(CourseDto::from(&course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/teacher/{teacherId}",
    params(("teacherId" = i64, Path, description = "Teacher user id")),
    responses(
        (status = 200, description = "Courses taught", body = [CourseDto]),
        (status = 404, description = "No such teacher", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getCoursesByTeacher"
)]
#[get("/courses/teacher/{teacher_id}")]
pub async fn courses_for_teacher(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<CourseDto>>> {
    let caller = session.require_caller()?;
    let courses = state
        .courses
        .courses_for_teacher(&caller, UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(course_list(&courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseDto),
        (status = 404, description = "No such course", body = Error)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<CourseDto>> {
    let caller = session.require_caller()?;
    let course = state
        .courses
        .get_course(&caller, CourseId::new(path.into_inner()))
        .await?;
    Ok(web::Json(CourseDto::from(&course)))
}

/// Update a course. A `schedules` array replaces the stored set; omitting it
/// keeps the set.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Updated course", body = CourseDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such course or teacher", body = Error),
        (status = 409, description = "Course code taken", body = Error),
        (status = 503, description = "Rolled back", body = Error)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<web::Json<CourseDto>> {
    let caller = session.require_caller()?;
    let form = CourseForm::try_from(payload.into_inner())?;
    let course = state
        .courses
        .update_course(&caller, CourseId::new(path.into_inner()), form)
        .await?;
    Ok(web::Json(CourseDto::from(&course)))
}

/// Delete a course with its schedules, assignments, submissions and
/// enrollments. Students and the teacher are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such course", body = Error),
        (status = 503, description = "Rolled back", body = Error)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    state
        .courses
        .delete_course(&caller, CourseId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/assignments",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Assignments by due date", body = [AssignmentDto]),
        (status = 404, description = "No such course", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "listAssignments"
)]
#[get("/courses/{id}/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<AssignmentDto>>> {
    let caller = session.require_caller()?;
    let assignments = state
        .courses
        .list_assignments(&caller, CourseId::new(path.into_inner()))
        .await?;
    Ok(web::Json(assignments.iter().map(AssignmentDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/assignments",
    params(("id" = i64, Path, description = "Course id")),
    request_body = AssignmentRequest,
    responses(
        (status = 201, description = "Created", body = AssignmentDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such course", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "createAssignment"
)]
#[post("/courses/{id}/assignments")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<AssignmentRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let draft = AssignmentDraft::try_from(payload.into_inner())?;
    let assignment = state
        .courses
        .create_assignment(&caller, CourseId::new(path.into_inner()), draft)
        .await?;
    Ok(HttpResponse::Created().json(AssignmentDto::from(&assignment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/students",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Enrolled students", body = [StudentDto]),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such course", body = Error)
    ),
    tags = ["enrollment"],
    operation_id = "getCourseRoster"
)]
#[get("/courses/{id}/students")]
pub async fn roster(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<StudentDto>>> {
    let caller = session.require_caller()?;
    let students = state
        .enrollments
        .roster_for_course(&caller, CourseId::new(path.into_inner()))
        .await?;
    let views = students
        .iter()
        .map(|user| StudentDto::new(user, None))
        .collect::<Result<_, _>>()?;
    Ok(web::Json(views))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/students/{studentId}",
    params(
        ("id" = i64, Path, description = "Course id"),
        ("studentId" = i64, Path, description = "Student user id")
    ),
    responses(
        (status = 204, description = "Enrolled"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such course or student", body = Error),
        (status = 409, description = "Already enrolled", body = Error)
    ),
    tags = ["enrollment"],
    operation_id = "enrollStudent"
)]
#[post("/courses/{id}/students/{student_id}")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let (course, student) = path.into_inner();
    state
        .enrollments
        .enroll(&caller, UserId::new(student), CourseId::new(course))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/students/{studentId}",
    params(
        ("id" = i64, Path, description = "Course id"),
        ("studentId" = i64, Path, description = "Student user id")
    ),
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not enrolled", body = Error)
    ),
    tags = ["enrollment"],
    operation_id = "withdrawStudent"
)]
#[delete("/courses/{id}/students/{student_id}")]
pub async fn withdraw(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let (course, student) = path.into_inner();
    state
        .enrollments
        .withdraw(&caller, UserId::new(student), CourseId::new(course))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "courses_tests.rs"]
mod tests;
