//! OpenAPI document for the campus API.
//!
//! Served by Swagger UI in debug builds and written to stdout by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AccountStatus, DayOfWeek, Error, ErrorCode, Role};
use crate::inbound::http::dto::{
    AssignmentDto, AssignmentRequest, CourseDto, CourseRequest, LoginRequest, ScheduleDto,
    ScheduleRequest, SessionUserDto, StatusRequest, StudentDto, StudentRequest, SubmissionDto,
    SubmissionRequest, TeacherDto, TeacherRequest, UserDto,
};
use crate::inbound::http::{assignments, auth, courses, health, students, teachers, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus records API",
        description = "Users, courses, schedules, assignments and enrollments behind a session cookie."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        auth::login,
        auth::logout,
        auth::register_student,
        users::list_users,
        users::update_status,
        students::list_students,
        students::create_student,
        students::get_student_by_number,
        students::get_student,
        students::update_student,
        students::student_courses,
        teachers::list_teachers,
        teachers::register_teacher,
        teachers::get_teacher_by_number,
        teachers::get_teacher,
        teachers::update_teacher,
        courses::list_courses,
        courses::create_course,
        courses::get_course_by_code,
        courses::courses_for_teacher,
        courses::get_course,
        courses::update_course,
        courses::delete_course,
        courses::list_assignments,
        courses::create_assignment,
        courses::roster,
        courses::enroll,
        courses::withdraw,
        assignments::submit,
        health::ready,
        health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        AccountStatus,
        DayOfWeek,
        LoginRequest,
        SessionUserDto,
        UserDto,
        StudentDto,
        StudentRequest,
        TeacherDto,
        TeacherRequest,
        ScheduleDto,
        ScheduleRequest,
        CourseDto,
        CourseRequest,
        AssignmentDto,
        AssignmentRequest,
        SubmissionDto,
        SubmissionRequest,
        StatusRequest,
    )),
    tags(
        (name = "auth", description = "Login, logout and student self-registration"),
        (name = "users", description = "Account administration"),
        (name = "students", description = "Student records"),
        (name = "teachers", description = "Teacher records"),
        (name = "courses", description = "Course catalog and schedules"),
        (name = "assignments", description = "Assignments and submissions"),
        (name = "enrollment", description = "Course rosters"),
        (name = "health", description = "Readiness and liveness probes")
    )
)]
pub struct ApiDoc;
