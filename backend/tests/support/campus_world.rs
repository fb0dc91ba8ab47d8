//! In-process campus backed by the memory store, driven through the same
//! services the HTTP handlers use.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{NaiveTime, TimeZone, Utc};
use mockable::{Clock, DefaultClock};
use tokio::runtime::{Builder, Runtime};

use campus_records::domain::ports::{CourseForm, StudentRegistration, TeacherRegistration};
use campus_records::domain::{
    Assignment, AssignmentDraft, CallerContext, Course, CourseCode, CourseDetails, DayOfWeek,
    Email, Error, LifecycleCoordinator, Password, PersonName, Registration, Role, RoleProfile,
    ScheduleDraft, StudentNumber, StudentProfile, TeacherNumber, TeacherProfile, User,
};
use campus_records::inbound::http::state::HttpState;
use campus_records::outbound::credentials::Argon2Hasher;
use campus_records::outbound::memory::MemoryStore;

const PASSWORD: &str = "member-secret";

pub struct CampusWorld {
    runtime: Runtime,
    pub store: Arc<MemoryStore>,
    pub state: HttpState,
    admin: User,
    people: HashMap<String, User>,
    courses: HashMap<String, Course>,
    pub assignment: Option<Assignment>,
    pub last_error: Option<Error>,
}

impl CampusWorld {
    pub fn new() -> Self {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let store = Arc::new(MemoryStore::new());
        let hasher = Arc::new(Argon2Hasher::new());
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let lifecycle = LifecycleCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&hasher),
            Arc::clone(&clock),
        );
        let admin = runtime
            .block_on(lifecycle.register(Registration {
                name: PersonName::new("Campus Admin").expect("name"),
                email: Email::new("admin@campus.test").expect("email"),
                password: Password::chosen("admin-secret").expect("password"),
                profile: RoleProfile::Admin,
            }))
            .expect("seed admin");
        let state = HttpState::from_stores(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            hasher,
            clock,
        );
        Self {
            runtime,
            store,
            state,
            admin,
            people: HashMap::new(),
            courses: HashMap::new(),
            assignment: None,
            last_error: None,
        }
    }

    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    pub fn admin(&self) -> CallerContext {
        CallerContext::new(self.admin.id(), Role::Admin)
    }

    pub fn person(&self, number: &str) -> &User {
        self.people
            .get(number)
            .unwrap_or_else(|| panic!("{number} was never registered"))
    }

    /// Caller context for a registered student or teacher.
    pub fn caller(&self, number: &str) -> CallerContext {
        let user = self.person(number);
        CallerContext::new(user.id(), user.role())
    }

    pub fn course(&self, code: &str) -> &Course {
        self.courses
            .get(code)
            .unwrap_or_else(|| panic!("{code} was never created"))
    }

    /// Keep the value of a successful call, or remember the failure.
    pub fn record<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                self.last_error = Some(err);
                None
            }
        }
    }

    pub fn add_teacher(&mut self, number: &str) {
        let registration = TeacherRegistration {
            name: PersonName::new(format!("Teacher {number}")).expect("name"),
            email: Email::new(format!("{}@campus.test", number.to_lowercase())).expect("email"),
            password: Password::chosen(PASSWORD).expect("password"),
            profile: TeacherProfile::new(TeacherNumber::new(number).expect("number"), "Science")
                .expect("profile"),
        };
        let user = self
            .block_on(
                self.state
                    .teachers
                    .register_teacher(&self.admin(), registration),
            )
            .expect("register teacher");
        self.people.insert(number.to_owned(), user);
    }

    pub fn add_student(&mut self, number: &str) {
        let registration = StudentRegistration {
            name: PersonName::new(format!("Student {number}")).expect("name"),
            email: Email::new(format!("{}@campus.test", number.to_lowercase())).expect("email"),
            password: Password::chosen(PASSWORD).expect("password"),
            profile: StudentProfile::new(
                StudentNumber::new(number).expect("number"),
                "Computer Science",
                "1",
            )
            .expect("profile"),
        };
        let user = self
            .block_on(
                self.state
                    .students
                    .register_student(&self.admin(), registration),
            )
            .expect("register student");
        self.people.insert(number.to_owned(), user);
    }

    /// Create the course, or update it when `code` is already tracked.
    pub fn save_course(
        &mut self,
        code: &str,
        teacher: &str,
        schedules: Option<Vec<ScheduleDraft>>,
    ) {
        let form = course_form(code, teacher, schedules);
        let result = match self.courses.get(code) {
            Some(existing) => {
                self.block_on(
                    self.state
                        .courses
                        .update_course(&self.admin(), existing.id, form),
                )
            }
            None => self.block_on(self.state.courses.create_course(&self.admin(), form)),
        };
        if let Some(course) = self.record(result) {
            self.courses.insert(code.to_owned(), course);
        }
    }

    /// Attempt a second course with `code` without tracking it.
    pub fn try_create_course(&mut self, code: &str, teacher: &str) {
        let form = course_form(code, teacher, None);
        let result = self.block_on(self.state.courses.create_course(&self.admin(), form));
        self.record(result);
    }

    /// Update course `from` to carry `to` as its code; the tracked entry
    /// stays under `from`.
    pub fn rename_course(&mut self, from: &str, to: &str) {
        let existing = self.course(from);
        let id = existing.id;
        let teacher = existing.teacher.number.to_string();
        let form = course_form(to, &teacher, None);
        let result = self.block_on(self.state.courses.update_course(&self.admin(), id, form));
        self.record(result);
    }

    /// Codes of every stored course, in listing order.
    pub fn listed_codes(&self) -> Vec<String> {
        self.block_on(self.state.courses.list_courses(&self.admin()))
            .expect("list courses")
            .iter()
            .map(|course| course.code().to_string())
            .collect()
    }

    pub fn reload_course(&mut self, code: &str) -> Option<Course> {
        let id = self.course(code).id;
        let result = self.block_on(self.state.courses.get_course(&self.admin(), id));
        self.record(result)
    }

    pub fn add_assignment(&mut self, code: &str) {
        let draft = AssignmentDraft::new(
            "Essay",
            "Write about recursion",
            Utc.with_ymd_and_hms(2026, 12, 1, 23, 59, 0)
                .single()
                .expect("due date"),
            20,
        )
        .expect("draft");
        let id = self.course(code).id;
        let assignment = self
            .block_on(
                self.state
                    .courses
                    .create_assignment(&self.admin(), id, draft),
            )
            .expect("create assignment");
        self.assignment = Some(assignment);
    }
}

pub fn schedule(day: DayOfWeek, start: (u32, u32), end: (u32, u32), room: &str) -> ScheduleDraft {
    let at = |(hour, minute): (u32, u32)| NaiveTime::from_hms_opt(hour, minute, 0).expect("time");
    ScheduleDraft::new(day, at(start), at(end), room).expect("schedule")
}

fn course_form(code: &str, teacher: &str, schedules: Option<Vec<ScheduleDraft>>) -> CourseForm {
    CourseForm {
        details: CourseDetails::new(
            format!("Course {code}"),
            CourseCode::new(code).expect("code"),
            "Behavioural fixture",
        )
        .expect("details"),
        teacher: TeacherNumber::new(teacher).expect("teacher number"),
        schedules,
    }
}
