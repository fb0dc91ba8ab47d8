//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::json;

use super::state::HttpState;
use super::{configure, json_config};
use crate::domain::ports::{CourseForm, StudentRegistration, TeacherRegistration};
use crate::domain::{
    CallerContext, Course, CourseCode, CourseDetails, Email, LifecycleCoordinator, Password,
    PersonName, Registration, Role, RoleProfile, StudentNumber, StudentProfile, TeacherNumber,
    TeacherProfile, User,
};
use crate::outbound::credentials::Argon2Hasher;
use crate::outbound::memory::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@campus.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";

/// Session middleware with a fresh key and an insecure `session` cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Real services over one in-memory store, seeded with an administrator.
pub struct MemoryApp {
    pub store: Arc<MemoryStore>,
    pub state: HttpState,
    pub admin: User,
}

pub async fn memory_app() -> MemoryApp {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(Argon2Hasher::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let admin = LifecycleCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&hasher),
        Arc::clone(&clock),
    )
    .register(Registration {
        name: PersonName::new("Campus Admin").expect("name"),
        email: Email::new(ADMIN_EMAIL).expect("email"),
        password: Password::chosen(ADMIN_PASSWORD).expect("password"),
        profile: RoleProfile::Admin,
    })
    .await
    .expect("seed admin");
    let state = HttpState::from_stores(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        hasher,
        clock,
    );
    MemoryApp {
        store,
        state,
        admin,
    }
}

/// The full `/api/v1` surface over `state`, behind a test session cookie.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(configure))
}

pub fn login_request(email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": password }))
}

pub const MEMBER_PASSWORD: &str = "member-secret";

pub fn member_email(number: &str) -> String {
    format!("{}@campus.test", number.to_lowercase())
}

impl MemoryApp {
    pub fn admin_caller(&self) -> CallerContext {
        CallerContext::new(self.admin.id(), Role::Admin)
    }

    pub async fn student(&self, number: &str) -> User {
        let registration = StudentRegistration {
            name: PersonName::new(format!("Student {number}")).expect("name"),
            email: Email::new(member_email(number)).expect("email"),
            password: Password::chosen(MEMBER_PASSWORD).expect("password"),
            profile: StudentProfile::new(
                StudentNumber::new(number).expect("number"),
                "Computer Science",
                "2",
            )
            .expect("profile"),
        };
        self.state
            .students
            .register_student(&self.admin_caller(), registration)
            .await
            .expect("register student")
    }

    pub async fn teacher(&self, number: &str) -> User {
        let registration = TeacherRegistration {
            name: PersonName::new(format!("Teacher {number}")).expect("name"),
            email: Email::new(member_email(number)).expect("email"),
            password: Password::chosen(MEMBER_PASSWORD).expect("password"),
            profile: TeacherProfile::new(TeacherNumber::new(number).expect("number"), "Science")
                .expect("profile"),
        };
        self.state
            .teachers
            .register_teacher(&self.admin_caller(), registration)
            .await
            .expect("register teacher")
    }

    pub async fn course(&self, code: &str, teacher: &str) -> Course {
        let form = CourseForm {
            details: CourseDetails::new(
                format!("Course {code}"),
                CourseCode::new(code).expect("code"),
                "Fixture course",
            )
            .expect("details"),
            teacher: TeacherNumber::new(teacher).expect("teacher number"),
            schedules: None,
        };
        self.state
            .courses
            .create_course(&self.admin_caller(), form)
            .await
            .expect("create course")
    }
}

/// Log in through the API and yield the session cookie.
macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {{
        let res = ::actix_web::test::call_service(
            $app,
            $crate::inbound::http::test_utils::login_request($email, $password).to_request(),
        )
        .await;
        assert_eq!(res.status(), ::actix_web::http::StatusCode::OK, "login failed");
        $crate::inbound::http::test_utils::session_cookie(&res)
    }};
}
pub(crate) use login;
