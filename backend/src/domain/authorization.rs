//! Role and ownership checks evaluated before any read or mutation.
//!
//! [`authorize`] is a pure function of the caller, the operation and the
//! resource descriptor. Services call it before touching a repository, so a
//! denial never reveals whether the target record exists.

use tracing::warn;

use super::{Error, Role, UserId};

/// Authenticated principal on whose behalf a service call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    subject: UserId,
    role: Role,
}

impl CallerContext {
    pub const fn new(subject: UserId, role: Role) -> Self {
        Self { subject, role }
    }

    pub const fn subject(&self) -> UserId {
        self.subject
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    const fn is(&self, id: UserId) -> bool {
        self.subject.get() == id.get()
    }
}

/// What the caller wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    List,
    Create,
    Update,
    Delete,
    ChangeStatus,
}

/// What the caller wants to do it to.
///
/// `Student(None)` and `Teacher(None)` describe the collection (listing,
/// registration, lookups by public number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Student(Option<UserId>),
    Teacher(Option<UserId>),
    Course,
    Assignment,
    Roster,
    Enrollment { student: UserId },
    Submission { student: UserId },
}

/// Allow or deny `operation` on `resource` for `caller`.
///
/// # Examples
/// ```
/// use campus_records::domain::{
///     authorize, CallerContext, ErrorCode, Operation, Resource, Role, UserId,
/// };
///
/// let student = CallerContext::new(UserId::new(7), Role::Student);
/// assert!(authorize(&student, Operation::Update, Resource::Student(Some(UserId::new(7)))).is_ok());
/// let denied = authorize(&student, Operation::Update, Resource::Student(Some(UserId::new(9))));
/// assert_eq!(denied.unwrap_err().code(), ErrorCode::Forbidden);
/// ```
pub fn authorize(
    caller: &CallerContext,
    operation: Operation,
    resource: Resource,
) -> Result<(), Error> {
    if permits(caller, operation, resource) {
        return Ok(());
    }
    warn!(
        subject = %caller.subject(),
        role = %caller.role(),
        ?operation,
        ?resource,
        "authorization denied"
    );
    Err(Error::forbidden(format!(
        "{} may not perform {operation:?} on this resource",
        caller.role()
    )))
}

fn permits(caller: &CallerContext, operation: Operation, resource: Resource) -> bool {
    use Operation::{Create, Delete, List, Read, Update};
    use Resource::{Assignment, Course, Enrollment, Roster, Student, Submission, Teacher};

    let open_read = matches!(
        (operation, resource),
        (Read | List, Course) | (Read | List, Assignment)
    );
    if open_read {
        return true;
    }

    match caller.role() {
        Role::Admin => true,
        Role::Teacher => match (operation, resource) {
            (Create | Update, Course) | (Create, Assignment) => true,
            (Read, Student(_) | Teacher(_)) | (List, Student(None)) => true,
            (Create, Student(None)) => true,
            (Update, Teacher(Some(id))) => caller.is(id),
            (Create | Delete, Enrollment { .. }) | (Read, Roster) => true,
            _ => false,
        },
        Role::Student => match (operation, resource) {
            (Read | Update, Student(Some(id))) => caller.is(id),
            (Create | Delete, Enrollment { student }) => caller.is(student),
            (Create, Submission { student }) => caller.is(student),
            _ => false,
        },
    }
}
