//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so they can be exercised over any store.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CourseCatalog, CourseRepository, CredentialHasher, EnrollmentLedger, EnrollmentRepository,
    LoginService, StudentRecords, TeacherRecords, UserDirectory, UserRepository,
};
use crate::domain::{CatalogService, EnrollmentService, IdentityService, LifecycleCoordinator};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserDirectory>,
    pub students: Arc<dyn StudentRecords>,
    pub teachers: Arc<dyn TeacherRecords>,
    pub courses: Arc<dyn CourseCatalog>,
    pub enrollments: Arc<dyn EnrollmentLedger>,
}

impl HttpState {
    /// Wire every service over one set of stores.
    pub fn from_stores<U, C, E, H>(
        users: Arc<U>,
        courses: Arc<C>,
        enrollments: Arc<E>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        U: UserRepository + 'static,
        C: CourseRepository + 'static,
        E: EnrollmentRepository + 'static,
        H: CredentialHasher + 'static,
    {
        let identity = Arc::new(IdentityService::new(
            Arc::clone(&users),
            Arc::clone(&enrollments),
            Arc::clone(&courses),
            Arc::clone(&hasher),
            Arc::clone(&clock),
        ));
        let lifecycle = LifecycleCoordinator::new(
            Arc::clone(&users),
            Arc::clone(&courses),
            hasher,
            Arc::clone(&clock),
        );
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&users),
            Arc::clone(&courses),
            lifecycle,
            Arc::clone(&clock),
        ));
        let ledger = Arc::new(EnrollmentService::new(users, courses, enrollments, clock));
        Self {
            login: identity.clone(),
            users: identity.clone(),
            students: identity.clone(),
            teachers: identity,
            courses: catalog,
            enrollments: ledger,
        }
    }
}
