//! Handler tests for the course, assignment and enrollment endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::CascadeStep;
use crate::inbound::http::test_utils::{
    ADMIN_EMAIL, ADMIN_PASSWORD, MEMBER_PASSWORD, api_app, login, member_email, memory_app,
};
use crate::outbound::memory::FaultPoint;

fn course_body(code: &str, schedules: Option<Value>) -> Value {
    let mut body = json!({
        "name": "Introduction to Programming",
        "code": code,
        "description": "Variables, loops and functions",
        "teacherId": "T1004"
    });
    if let Some(schedules) = schedules {
        body["schedules"] = schedules;
    }
    body
}

fn monday() -> Value {
    json!([{"day": "MONDAY", "startTime": "09:00", "endTime": "10:30", "room": "B12"}])
}

#[rstest]
#[actix_web::test]
async fn courses_are_created_with_schedules_and_codes_stay_unique() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(admin.clone())
            .set_json(course_body("CS101", Some(monday())))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["teacherId"], "T1004");
    assert_eq!(body["schedules"][0]["day"], "MONDAY");
    assert_eq!(body["schedules"][0]["startTime"], "09:00:00");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(admin.clone())
            .set_json(course_body("CS101", None))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "code");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/courses/code/CS101")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case(json!("T9999"), StatusCode::NOT_FOUND)]
#[case(json!("teacher"), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn the_named_teacher_must_exist(#[case] teacher: Value, #[case] expected: StatusCode) {
    let fixture = memory_app().await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);
    let mut body = course_body("CS101", None);
    body["teacherId"] = teacher;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(admin)
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn updates_keep_schedules_unless_a_new_set_is_supplied() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    let course = fixture.course("CS101", "T1004").await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let teacher = login!(&app, &member_email("T1004"), MEMBER_PASSWORD);
    let uri = format!("/api/v1/courses/{}", course.id.get());

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .cookie(teacher.clone())
            .set_json(course_body("CS101", Some(monday())))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .cookie(teacher.clone())
            .set_json(course_body("CS102", None))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "CS102");
    assert_eq!(body["schedules"].as_array().map(Vec::len), Some(1));

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .cookie(teacher)
            .set_json(course_body("CS102", Some(json!([]))))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["schedules"], json!([]));
}

fn week() -> Value {
    json!([
        {"day": "MONDAY", "startTime": "09:00", "endTime": "10:30", "room": "B12"},
        {"day": "WEDNESDAY", "startTime": "13:00", "endTime": "14:00", "room": "Lab 2"},
        {"day": "FRIDAY", "startTime": "16:15", "endTime": "17:45", "room": "B12"}
    ])
}

/// (day, start, end, room) of each schedule, sorted.
fn slots(course: &Value) -> Vec<(String, String, String, String)> {
    let mut slots: Vec<_> = course["schedules"]
        .as_array()
        .expect("schedules array")
        .iter()
        .map(|s| {
            let field = |name: &str| s[name].as_str().expect("string field").to_owned();
            (field("day"), field("startTime"), field("endTime"), field("room"))
        })
        .collect();
    slots.sort();
    slots
}

#[rstest]
#[actix_web::test]
async fn a_full_week_of_schedules_round_trips_and_replacing_it_is_stable() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/courses")
            .cookie(admin.clone())
            .set_json(course_body("CS101", Some(week())))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    let expected = slots(&created);
    assert_eq!(expected.len(), 3);
    assert!(expected.contains(&(
        "FRIDAY".to_owned(),
        "16:15:00".to_owned(),
        "17:45:00".to_owned(),
        "B12".to_owned()
    )));
    let uri = format!("/api/v1/courses/{}", created["id"]);

    let fetched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(slots(&fetched), expected);

    for _ in 0..2 {
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&uri)
                .cookie(admin.clone())
                .set_json(course_body("CS101", Some(week())))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(res).await;
        assert_eq!(slots(&updated), expected);
    }
}

#[rstest]
#[actix_web::test]
async fn renaming_a_course_to_a_taken_code_conflicts() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    fixture.course("CS101", "T1004").await;
    let other = fixture.course("CS202", "T1004").await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{}", other.id.get()))
            .cookie(admin.clone())
            .set_json(course_body("CS101", None))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "code");

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/courses")
            .cookie(admin)
            .to_request(),
    )
    .await;
    let codes: Vec<&str> = listed
        .as_array()
        .expect("course list")
        .iter()
        .filter_map(|course| course["code"].as_str())
        .collect();
    assert_eq!(codes.iter().filter(|code| **code == "CS101").count(), 1);
    assert!(codes.contains(&"CS202"));
}

#[rstest]
#[actix_web::test]
async fn enrollment_is_visible_from_course_and_student() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    let student = fixture.student("S0042").await;
    let course = fixture.course("CS101", "T1004").await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let cookie = login!(&app, &member_email("S0042"), MEMBER_PASSWORD);
    let enroll_uri = format!("/api/v1/courses/{}/students/{}", course.id.get(), student.id());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&enroll_uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&enroll_uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/students/{}", student.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["enrolledCourses"][0]["code"], "CS101");

    let teacher = login!(&app, &member_email("T1004"), MEMBER_PASSWORD);
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/courses/{}/students", course.id.get()))
            .cookie(teacher)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body[0]["studentId"], "S0042");

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&enroll_uri)
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn deleting_a_course_keeps_its_people() {
    let fixture = memory_app().await;
    let teacher = fixture.teacher("T1004").await;
    let student = fixture.student("S0042").await;
    let course = fixture.course("CS101", "T1004").await;
    fixture
        .state
        .enrollments
        .enroll(&fixture.admin_caller(), student.id(), course.id)
        .await
        .expect("enroll");
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/courses/{}", course.id.get()))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/students/{}", student.id()))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["enrolledCourses"], json!([]));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/teachers/{}", teacher.id()))
            .cookie(admin)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["assignedCourses"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn a_rolled_back_delete_reports_transaction_failure() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    let course = fixture.course("CS101", "T1004").await;
    fixture
        .store
        .fail_at(FaultPoint::Cascade(CascadeStep::DeleteCourse));
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let admin = login!(&app, ADMIN_EMAIL, ADMIN_PASSWORD);
    let uri = format!("/api/v1/courses/{}", course.id.get());

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&uri)
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "transaction_failed");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&uri).cookie(admin).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn students_read_courses_but_cannot_change_them() {
    let fixture = memory_app().await;
    fixture.teacher("T1004").await;
    fixture.student("S0042").await;
    let course = fixture.course("CS101", "T1004").await;
    let app = test::init_service(api_app(fixture.state.clone())).await;
    let cookie = login!(&app, &member_email("S0042"), MEMBER_PASSWORD);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/courses")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/courses/{}", course.id.get()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/courses/{}/assignments", course.id.get()))
            .cookie(cookie)
            .set_json(json!({
                "title": "Essay",
                "description": "Write one",
                "dueDate": "2026-10-01T23:59:00Z",
                "totalPoints": 10
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn anonymous_callers_are_unauthorised() {
    let fixture = memory_app().await;
    let app = test::init_service(api_app(fixture.state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/courses").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
