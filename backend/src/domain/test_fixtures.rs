//! Fixed clock and sample records shared by service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    AccountStatus, Course, CourseCode, CourseDetails, CourseId, CourseTeacher, CredentialHash,
    Email, NewUser, PersonName, RoleProfile, StudentNumber, StudentProfile, TeacherNumber,
    TeacherProfile, User, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

fn new_user(number: &str, profile: RoleProfile) -> NewUser {
    NewUser {
        name: PersonName::new(format!("Person {number}")).expect("name"),
        email: Email::new(format!("{}@campus.test", number.to_lowercase())).expect("email"),
        credential: CredentialHash::new("$argon2id$fixture"),
        status: AccountStatus::Active,
        profile,
        created_at: fixture_timestamp(),
    }
}

/// Unsaved student; the email is derived from the number.
pub(crate) fn new_student(number: &str) -> NewUser {
    let profile = StudentProfile::new(
        StudentNumber::new(number).expect("student number"),
        "Computer Science",
        "2",
    )
    .expect("student profile");
    new_user(number, RoleProfile::Student(profile))
}

pub(crate) fn new_teacher(number: &str) -> NewUser {
    let profile = TeacherProfile::new(TeacherNumber::new(number).expect("teacher number"), "Science")
        .expect("teacher profile");
    new_user(number, RoleProfile::Teacher(profile))
}

pub(crate) fn student_user(id: i64, number: &str) -> User {
    User::from_new(UserId::new(id), new_student(number))
}

pub(crate) fn teacher_user(id: i64, number: &str) -> User {
    User::from_new(UserId::new(id), new_teacher(number))
}

pub(crate) fn course_of(id: i64, code: &str, teacher: &User) -> Course {
    let number = teacher
        .teacher()
        .map(|profile| profile.teacher_number().clone())
        .expect("teacher profile");
    Course {
        id: CourseId::new(id),
        details: CourseDetails::new(
            format!("Course {code}"),
            CourseCode::new(code).expect("course code"),
            "Fixture course",
        )
        .expect("course details"),
        teacher: CourseTeacher {
            id: teacher.id(),
            number,
        },
        schedules: Vec::new(),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}
