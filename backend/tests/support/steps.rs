//! Steps used by more than one feature.

use campus_records::domain::ports::EnrollmentRepository;
use rstest_bdd_macros::{given, then};

use super::campus_world::CampusWorld;

#[given("teacher {number} is registered")]
fn teacher_is_registered(world: &mut CampusWorld, number: String) {
    world.add_teacher(&number);
}

#[given("student {number} is registered")]
fn student_is_registered(world: &mut CampusWorld, number: String) {
    world.add_student(&number);
}

#[given("course {code} exists for {teacher}")]
fn course_exists(world: &mut CampusWorld, code: String, teacher: String) {
    world.save_course(&code, &teacher, None);
    assert!(world.last_error.is_none(), "{:?}", world.last_error);
}

#[given("student {number} is enrolled in {code}")]
fn student_is_enrolled(world: &mut CampusWorld, number: String, code: String) {
    let student = world.person(&number).id();
    let course = world.course(&code).id;
    world
        .block_on(
            world
                .state
                .enrollments
                .enroll(&world.admin(), student, course),
        )
        .expect("enroll");
}

#[given("course {code} has an assignment")]
fn course_has_an_assignment(world: &mut CampusWorld, code: String) {
    world.add_assignment(&code);
}

#[then("the request succeeds")]
fn the_request_succeeds(world: &mut CampusWorld) {
    assert!(world.last_error.is_none(), "unexpected {:?}", world.last_error);
}

#[then("the request fails with {code}")]
fn the_request_fails_with(world: &mut CampusWorld, code: String) {
    let err = world.last_error.as_ref().expect("an error was recorded");
    let actual = serde_json::to_value(err.code()).expect("code serialises");
    assert_eq!(actual.as_str(), Some(code.as_str()), "{err:?}");
}

#[then("the roster of {code} lists {number}")]
fn the_roster_lists(world: &mut CampusWorld, code: String, number: String) {
    let student = world.person(&number).id();
    let course = world.course(&code).id;
    let enrolled = world
        .block_on(world.store.is_enrolled(student, course))
        .expect("enrollment lookup");
    assert!(enrolled, "{number} is not on the roster of {code}");
}

#[then("student {number} has no enrolled courses")]
fn student_has_no_enrolled_courses(world: &mut CampusWorld, number: String) {
    let id = world.person(&number).id();
    let record = world
        .block_on(world.state.students.get_student(&world.admin(), id))
        .expect("student record");
    assert!(record.enrolled_courses.is_empty());
}
