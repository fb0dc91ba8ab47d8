//! HTTP inbound adapter exposing the campus REST endpoints under `/api/v1`.

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dto;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
pub mod students;
pub mod teachers;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

use crate::domain::Error;

/// Register every API handler on `cfg`.
///
/// Literal segments (`number`, `code`, `teacher`) are registered before the
/// `{id}` routes that would otherwise capture them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::register_student)
        .service(users::list_users)
        .service(users::update_status)
        .service(students::list_students)
        .service(students::create_student)
        .service(students::get_student_by_number)
        .service(students::student_courses)
        .service(students::get_student)
        .service(students::update_student)
        .service(teachers::list_teachers)
        .service(teachers::register_teacher)
        .service(teachers::get_teacher_by_number)
        .service(teachers::get_teacher)
        .service(teachers::update_teacher)
        .service(courses::list_courses)
        .service(courses::create_course)
        .service(courses::get_course_by_code)
        .service(courses::courses_for_teacher)
        .service(courses::list_assignments)
        .service(courses::create_assignment)
        .service(courses::roster)
        .service(courses::enroll)
        .service(courses::withdraw)
        .service(courses::get_course)
        .service(courses::update_course)
        .service(courses::delete_course)
        .service(assignments::submit);
}

/// JSON extractor settings; malformed bodies become `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed request body: {err}")).into()
    })
}
