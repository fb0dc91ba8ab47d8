//! Server construction: store selection, administrator seeding and
//! middleware wiring.

mod config;

pub use config::{ServerConfig, ServerSettings};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use campus_records::Trace;
#[cfg(debug_assertions)]
use campus_records::doc::ApiDoc;
use campus_records::domain::ports::{
    CourseRepository, CredentialHasher, EnrollmentRepository, UserRepository,
};
use campus_records::domain::{
    Email, ErrorCode, LifecycleCoordinator, Password, PersonName, Registration, RoleProfile,
};
use campus_records::inbound::http::health::{HealthState, live, ready};
use campus_records::inbound::http::state::HttpState;
use campus_records::inbound::http::{configure, json_config};
use campus_records::outbound::credentials::Argon2Hasher;
use campus_records::outbound::memory::MemoryStore;
use campus_records::outbound::persistence::{
    DbPool, DieselCourseRepository, DieselEnrollmentRepository, DieselUserRepository, PoolConfig,
    run_migrations,
};

const SEEDED_ADMIN_NAME: &str = "Campus Administrator";

/// Build handler state over PostgreSQL when a database URL is configured,
/// otherwise over a process-local store.
///
/// # Errors
///
/// Pool construction, migration or administrator seeding failures.
pub async fn build_http_state(settings: &ServerSettings) -> std::io::Result<HttpState> {
    let hasher = Arc::new(Argon2Hasher::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url).await.map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()))
                .await
                .map_err(std::io::Error::other)?;
            info!(pool_size = settings.pool_size(), "serving from PostgreSQL");
            wire(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselCourseRepository::new(pool.clone())),
                Arc::new(DieselEnrollmentRepository::new(pool)),
                hasher,
                clock,
                settings,
            )
            .await
        }
        None => {
            warn!("no database configured; records are kept in memory only");
            let store = Arc::new(MemoryStore::new());
            wire(
                Arc::clone(&store),
                Arc::clone(&store),
                store,
                hasher,
                clock,
                settings,
            )
            .await
        }
    }
}

async fn wire<U, C, E, H>(
    users: Arc<U>,
    courses: Arc<C>,
    enrollments: Arc<E>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    settings: &ServerSettings,
) -> std::io::Result<HttpState>
where
    U: UserRepository + 'static,
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
    H: CredentialHasher + 'static,
{
    if let Some((email, password)) = settings.admin_credentials() {
        let lifecycle = LifecycleCoordinator::new(
            Arc::clone(&users),
            Arc::clone(&courses),
            Arc::clone(&hasher),
            Arc::clone(&clock),
        );
        seed_admin(&lifecycle, email, password).await?;
    }
    Ok(HttpState::from_stores(
        users,
        courses,
        enrollments,
        hasher,
        clock,
    ))
}

async fn seed_admin<U, C, H>(
    lifecycle: &LifecycleCoordinator<U, C, H>,
    email: &str,
    password: &str,
) -> std::io::Result<()>
where
    U: UserRepository,
    C: CourseRepository,
    H: CredentialHasher,
{
    let invalid = |err: String| std::io::Error::new(std::io::ErrorKind::InvalidInput, err);
    let registration = Registration {
        name: PersonName::new(SEEDED_ADMIN_NAME).map_err(|err| invalid(err.to_string()))?,
        email: Email::new(email).map_err(|err| invalid(err.to_string()))?,
        password: Password::chosen(password).map_err(|err| invalid(err.to_string()))?,
        profile: RoleProfile::Admin,
    };
    match lifecycle.register(registration).await {
        Ok(admin) => {
            info!(user_id = admin.id().get(), "administrator seeded");
            Ok(())
        }
        Err(err) if err.code() == ErrorCode::Conflict => {
            info!("administrator already present");
            Ok(())
        }
        Err(err) => Err(std::io::Error::other(err)),
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: Arc<ServerConfig>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        config,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), config.key.clone())
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(config.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(config.same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(8)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and mark the process ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let bind_addr = config.bind_addr;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        config: Arc::new(config),
    };
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
