//! Session helpers so handlers deal in callers, not cookies.
//!
//! The private session cookie carries the subject id and role established at
//! login. Every request rebuilds a [`CallerContext`] from it; nothing else
//! about the caller is trusted from the client.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AuthenticatedUser, CallerContext, Error, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Wrapper exposing caller-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated subject and role in the session cookie.
    pub fn persist_caller(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user.id.get())
            .and_then(|()| self.0.insert(ROLE_KEY, user.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Rebuild the caller from the session, if one is present and intact.
    pub fn caller(&self) -> Result<Option<CallerContext>, Error> {
        let read = |error| Error::internal(format!("failed to read session: {error}"));
        let id = self.0.get::<i64>(USER_ID_KEY).map_err(read)?;
        let role = self.0.get::<String>(ROLE_KEY).map_err(read)?;
        let (Some(id), Some(role)) = (id, role) else {
            return Ok(None);
        };
        match role.parse::<Role>() {
            Ok(role) => Ok(Some(CallerContext::new(UserId::new(id), role))),
            Err(error) => {
                warn!(%error, "invalid role in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a caller or fail with `401 Unauthorized`.
    pub fn require_caller(&self) -> Result<CallerContext, Error> {
        self.caller()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;
    use crate::domain::{Email, PersonName};
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    fn teacher() -> AuthenticatedUser {
        AuthenticatedUser {
            id: UserId::new(12),
            name: PersonName::new("Ada Byron").expect("name"),
            email: Email::new("ada@campus.test").expect("email"),
            role: Role::Teacher,
        }
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let caller = session.require_caller()?;
        Ok(HttpResponse::Ok().body(format!("{}:{}", caller.subject(), caller.role().as_str())))
    }

    #[rstest]
    #[actix_web::test]
    async fn caller_round_trips_through_the_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_caller(&teacher())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/login").to_request())
            .await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "12:TEACHER");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_caller_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_role_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/forge",
                    web::get().to(|session: Session| async move {
                        session.insert(USER_ID_KEY, 1_i64).expect("id");
                        session.insert(ROLE_KEY, "JANITOR").expect("role");
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/forge").to_request()).await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
