//! Integration tests for the Diesel course, user and enrollment adapters
//! against embedded PostgreSQL.
//!
//! Each test provisions its own migrated database. Tests stay synchronous
//! and drive the async repositories through a runtime owned by the context.

use std::collections::HashSet;
use std::future::Future;

use campus_records::domain::ports::{
    CourseRepository, CourseRepositoryError, EnrollmentRepository, UserRepository,
};
use campus_records::domain::{
    AccountStatus, AssignmentDraft, Course, CourseChanges, CourseCode, CourseDeletionPlan,
    CourseDetails, CourseTeacher, CredentialHash, DayOfWeek, Email, NewCourse, NewSubmission,
    NewUser, PersonName, RoleProfile, ScheduleDraft, StudentNumber, StudentProfile, TeacherNumber,
    TeacherProfile, User,
};
use campus_records::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselEnrollmentRepository, DieselUserRepository, PoolConfig,
};
use chrono::{NaiveTime, TimeZone, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{count_rows, handle_cluster_setup_failure, provision_database};

struct TestContext {
    runtime: Runtime,
    users: DieselUserRepository,
    courses: DieselCourseRepository,
    enrollments: DieselEnrollmentRepository,
    database_url: String,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    fn rows(&self, table: &str) -> i64 {
        count_rows(&self.database_url, table)
    }

    fn teacher(&self, number: &str) -> User {
        let profile = TeacherProfile::new(TeacherNumber::new(number).expect("number"), "Science")
            .expect("profile");
        self.person(number, RoleProfile::Teacher(profile))
    }

    fn student(&self, number: &str) -> User {
        let profile = StudentProfile::new(StudentNumber::new(number).expect("number"), "Maths", "2")
            .expect("profile");
        self.person(number, RoleProfile::Student(profile))
    }

    fn person(&self, number: &str, profile: RoleProfile) -> User {
        let user = NewUser {
            name: PersonName::new(format!("Member {number}")).expect("name"),
            email: Email::new(format!("{}@campus.test", number.to_lowercase())).expect("email"),
            credential: CredentialHash::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            status: AccountStatus::Active,
            profile,
            created_at: Utc::now(),
        };
        self.block_on(self.users.create(user)).expect("create user")
    }

    fn course(&self, code: &str, teacher: &User, schedules: Vec<ScheduleDraft>) -> Course {
        self.block_on(self.courses.create(new_course(code, teacher, schedules)))
            .expect("create course")
    }
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_database(&runtime)?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        users: DieselUserRepository::new(pool.clone()),
        courses: DieselCourseRepository::new(pool.clone()),
        enrollments: DieselEnrollmentRepository::new(pool),
        database_url,
        _database: database,
    })
}

#[fixture]
fn diesel_world() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn slot(day: DayOfWeek, start: (u32, u32), end: (u32, u32), room: &str) -> ScheduleDraft {
    let at = |(hour, minute): (u32, u32)| NaiveTime::from_hms_opt(hour, minute, 0).expect("time");
    ScheduleDraft::new(day, at(start), at(end), room).expect("schedule")
}

fn teacher_ref(teacher: &User) -> CourseTeacher {
    CourseTeacher {
        id: teacher.id(),
        number: teacher
            .teacher()
            .map(|profile| profile.teacher_number().clone())
            .expect("teacher profile"),
    }
}

fn details(code: &str) -> CourseDetails {
    CourseDetails::new(
        format!("Course {code}"),
        CourseCode::new(code).expect("code"),
        "Stored in PostgreSQL",
    )
    .expect("details")
}

fn new_course(code: &str, teacher: &User, schedules: Vec<ScheduleDraft>) -> NewCourse {
    NewCourse {
        details: details(code),
        teacher: teacher_ref(teacher),
        schedules,
        created_at: Utc::now(),
    }
}

fn changes(course: &Course, code: &str, schedules: Option<Vec<ScheduleDraft>>) -> CourseChanges {
    CourseChanges {
        id: course.id,
        details: details(code),
        teacher: course.teacher.clone(),
        schedules,
        updated_at: Utc::now(),
    }
}

fn slots(course: &Course) -> HashSet<(DayOfWeek, NaiveTime, NaiveTime, String)> {
    course
        .schedules
        .iter()
        .map(|s| (s.day, s.start_time, s.end_time, s.room.clone()))
        .collect()
}

#[rstest]
fn duplicate_codes_are_reported_on_the_code_field(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_codes_are_reported_on_the_code_field skipped");
        return;
    };
    let teacher = world.teacher("T1004");
    world.course("CS101", &teacher, Vec::new());

    let error = world
        .block_on(world.courses.create(new_course(
            "CS101",
            &teacher,
            vec![slot(DayOfWeek::Monday, (9, 0), (10, 0), "B12")],
        )))
        .expect_err("code is taken");

    assert_eq!(error, CourseRepositoryError::duplicate("code", "CS101"));
    assert_eq!(world.rows("courses"), 1);
    assert_eq!(world.rows("schedules"), 0, "rejected schedules must roll back");
    let listed = world.block_on(world.courses.list()).expect("list");
    let cs101 = listed
        .iter()
        .filter(|course| course.code().as_str() == "CS101")
        .count();
    assert_eq!(cs101, 1);
}

#[rstest]
fn renaming_onto_a_taken_code_is_a_duplicate(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: renaming_onto_a_taken_code_is_a_duplicate skipped");
        return;
    };
    let teacher = world.teacher("T1004");
    world.course("CS101", &teacher, Vec::new());
    let other = world.course("CS202", &teacher, Vec::new());

    let error = world
        .block_on(world.courses.update(changes(&other, "CS101", None)))
        .expect_err("code is taken");

    assert!(
        matches!(&error, CourseRepositoryError::Duplicate { field, .. } if field == "code"),
        "unexpected {error:?}"
    );
    let reloaded = world
        .block_on(world.courses.find_by_id(other.id))
        .expect("find")
        .expect("course");
    assert_eq!(reloaded.code().as_str(), "CS202");
}

#[rstest]
fn update_replaces_schedules_only_when_a_set_is_supplied(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        eprintln!(
            "SKIP-TEST-CLUSTER: update_replaces_schedules_only_when_a_set_is_supplied skipped"
        );
        return;
    };
    let teacher = world.teacher("T1004");
    let course = world.course(
        "CS101",
        &teacher,
        vec![slot(DayOfWeek::Monday, (9, 0), (10, 30), "B12")],
    );
    let original = slots(&course);

    let kept = world
        .block_on(world.courses.update(changes(&course, "CS102", None)))
        .expect("update")
        .expect("course");
    assert_eq!(kept.code().as_str(), "CS102");
    assert_eq!(slots(&kept), original);

    let week = vec![
        slot(DayOfWeek::Tuesday, (13, 0), (14, 0), "Lab 2"),
        slot(DayOfWeek::Thursday, (16, 15), (17, 45), "B14"),
    ];
    let once = world
        .block_on(world.courses.update(changes(&course, "CS102", Some(week.clone()))))
        .expect("update")
        .expect("course");
    let twice = world
        .block_on(world.courses.update(changes(&course, "CS102", Some(week))))
        .expect("update")
        .expect("course");
    assert_eq!(slots(&once), slots(&twice));
    assert_eq!(twice.schedules.len(), 2);
    assert!(slots(&twice).is_disjoint(&original));
    assert_eq!(world.rows("schedules"), 2);

    let found = world
        .block_on(world.courses.find_by_code(twice.code()))
        .expect("find")
        .expect("course");
    assert_eq!(slots(&found), slots(&twice));

    let cleared = world
        .block_on(world.courses.update(changes(&course, "CS102", Some(Vec::new()))))
        .expect("update")
        .expect("course");
    assert!(cleared.schedules.is_empty());
    assert_eq!(world.rows("schedules"), 0);
}

#[rstest]
fn cascade_delete_removes_dependants_and_keeps_people(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: cascade_delete_removes_dependants_and_keeps_people skipped");
        return;
    };
    let teacher = world.teacher("T1004");
    let student = world.student("S0042");
    let course = world.course(
        "CS101",
        &teacher,
        vec![
            slot(DayOfWeek::Monday, (9, 0), (10, 30), "B12"),
            slot(DayOfWeek::Wednesday, (9, 0), (10, 30), "B12"),
        ],
    );
    world
        .block_on(world.enrollments.enroll(student.id(), course.id, Utc::now()))
        .expect("enroll");
    let draft = AssignmentDraft::new(
        "Essay",
        "Write about recursion",
        Utc.with_ymd_and_hms(2026, 12, 1, 23, 59, 0)
            .single()
            .expect("due date"),
        20,
    )
    .expect("draft");
    let assignment = world
        .block_on(world.courses.create_assignment(course.id, draft, Utc::now()))
        .expect("assignment");
    world
        .block_on(world.enrollments.record_submission(NewSubmission {
            assignment_id: assignment.id,
            student_id: student.id(),
            file_reference: Some("essay.pdf".to_owned()),
            submitted_at: Utc::now(),
        }))
        .expect("submission");

    world
        .block_on(world.courses.delete(&CourseDeletionPlan::for_course(course.id)))
        .expect("cascade");

    for table in ["student_courses", "submissions", "assignments", "schedules", "courses"] {
        assert_eq!(world.rows(table), 0, "{table} still has rows");
    }
    assert_eq!(world.rows("users"), 2);
    assert_eq!(world.rows("students"), 1);
    assert_eq!(world.rows("teachers"), 1);
    assert!(
        world
            .block_on(world.courses.find_by_id(course.id))
            .expect("find")
            .is_none()
    );
    assert!(
        world
            .block_on(world.enrollments.courses_for_student(student.id()))
            .expect("student courses")
            .is_empty()
    );
    let teacher_again = world
        .block_on(world.users.find_by_id(teacher.id()))
        .expect("find")
        .expect("teacher survives");
    assert_eq!(teacher_again.profile(), teacher.profile());
}

#[rstest]
fn roster_and_student_courses_read_the_same_ledger(diesel_world: Option<TestContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: roster_and_student_courses_read_the_same_ledger skipped");
        return;
    };
    let teacher = world.teacher("T1004");
    let student = world.student("S0042");
    let course = world.course(
        "CS101",
        &teacher,
        vec![slot(DayOfWeek::Friday, (8, 0), (9, 0), "A1")],
    );
    world
        .block_on(world.enrollments.enroll(student.id(), course.id, Utc::now()))
        .expect("enroll");

    let roster = world
        .block_on(world.enrollments.roster(course.id))
        .expect("roster");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster.first().map(User::id), Some(student.id()));
    assert_eq!(roster.first().map(User::profile), Some(student.profile()));

    let enrolled = world
        .block_on(world.enrollments.courses_for_student(student.id()))
        .expect("student courses");
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled.first().map(slots), Some(slots(&course)));
}
