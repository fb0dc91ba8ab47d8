//! User records and their role-specific profiles.
//!
//! A user is one record carrying the shared account fields plus a
//! [`RoleProfile`] attachment. The role is derived from the attachment, so it
//! cannot change once the record exists.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised by the user newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidEmail,
    InvalidStudentNumber,
    InvalidTeacherNumber,
    EmptyProgram,
    EmptyYear,
    EmptyDepartment,
    UnknownRole(String),
    UnknownStatus(String),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email should be valid"),
            Self::InvalidStudentNumber => write!(
                f,
                "student id must start with 'S' followed by at least 4 digits"
            ),
            Self::InvalidTeacherNumber => write!(
                f,
                "teacher id must start with 'T' followed by at least 4 digits"
            ),
            Self::EmptyProgram => write!(f, "program is required"),
            Self::EmptyYear => write!(f, "year is required"),
            Self::EmptyDepartment => write!(f, "department is required"),
            Self::UnknownRole(raw) => write!(f, "unknown role '{raw}'"),
            Self::UnknownStatus(raw) => write!(f, "unknown status '{raw}'"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Wire name of the field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidEmail => "email",
            Self::InvalidStudentNumber => "studentId",
            Self::InvalidTeacherNumber => "teacherId",
            Self::EmptyProgram => "program",
            Self::EmptyYear => "year",
            Self::EmptyDepartment => "department",
            Self::UnknownRole(_) => "role",
            Self::UnknownStatus(_) => "status",
        }
    }
}

/// Surrogate key of a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(source).unwrap_or_else(|error| panic!("pattern {source} failed to compile: {error}"))
    })
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "String", into = "String")]
        #[schema(value_type = String)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

/// Maximum length of a person's full name.
pub const NAME_MAX: usize = 100;

string_newtype! {
    /// Full display name of a person, trimmed and non-empty.
    PersonName
}

impl PersonName {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Join a first and last name the way registration forms collect them.
    pub fn from_parts(first: &str, last: &str) -> Result<Self, UserValidationError> {
        Self::new(format!("{} {}", first.trim(), last.trim()))
    }
}

string_newtype! {
    /// Login email address; unique across all users.
    Email
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

impl Email {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if !pattern(&EMAIL_RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

string_newtype! {
    /// Public student number such as `S0042`.
    StudentNumber
}

static STUDENT_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

impl StudentNumber {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if !pattern(&STUDENT_NUMBER_RE, r"^S\d{4,}$").is_match(&raw) {
            return Err(UserValidationError::InvalidStudentNumber);
        }
        Ok(Self(raw))
    }
}

string_newtype! {
    /// Public teacher number such as `T1004`.
    TeacherNumber
}

static TEACHER_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

impl TeacherNumber {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if !pattern(&TEACHER_NUMBER_RE, r"^T\d{4,}$").is_match(&raw) {
            return Err(UserValidationError::InvalidTeacherNumber);
        }
        Ok(Self(raw))
    }
}

/// Access role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "TEACHER" => Ok(Self::Teacher),
            "STUDENT" => Ok(Self::Student),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Account lifecycle state. Transitions between states are unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "SUSPENDED" => Ok(Self::Suspended),
            other => Err(UserValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

fn required(raw: String, error: UserValidationError) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Student attachment. Enrolled courses are read from the enrollment ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    student_number: StudentNumber,
    program: String,
    year: String,
}

impl StudentProfile {
    pub fn new(
        student_number: StudentNumber,
        program: impl Into<String>,
        year: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            student_number,
            program: required(program.into(), UserValidationError::EmptyProgram)?,
            year: required(year.into(), UserValidationError::EmptyYear)?,
        })
    }

    pub fn student_number(&self) -> &StudentNumber {
        &self.student_number
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn year(&self) -> &str {
        &self.year
    }
}

/// Teacher attachment. Owned courses are read from the course catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherProfile {
    teacher_number: TeacherNumber,
    department: String,
}

impl TeacherProfile {
    pub fn new(
        teacher_number: TeacherNumber,
        department: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            teacher_number,
            department: required(department.into(), UserValidationError::EmptyDepartment)?,
        })
    }

    pub fn teacher_number(&self) -> &TeacherNumber {
        &self.teacher_number
    }

    pub fn department(&self) -> &str {
        &self.department
    }
}

/// Role-specific data attached to a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    Admin,
    Student(StudentProfile),
    Teacher(TeacherProfile),
}

impl RoleProfile {
    pub const fn role(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Student(_) => Role::Student,
            Self::Teacher(_) => Role::Teacher,
        }
    }
}

/// Opaque credential hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Returned when a profile update targets a user of another role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleMismatch {
    pub expected: Role,
    pub actual: Role,
}

/// Fields supplied when inserting a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: PersonName,
    pub email: Email,
    pub credential: CredentialHash,
    pub status: AccountStatus,
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
}

/// Stored user record.
///
/// ## Invariants
/// - `role()` always agrees with the profile variant and never changes.
/// - `updated_at` is refreshed by every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: PersonName,
    email: Email,
    credential: CredentialHash,
    status: AccountStatus,
    profile: RoleProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Materialise a freshly inserted record.
    pub fn from_new(id: UserId, new: NewUser) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            credential: new.credential,
            status: new.status,
            profile: new.profile,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    /// Restore the stored `updated_at` timestamp when loading a record.
    #[must_use]
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn credential(&self) -> &CredentialHash {
        &self.credential
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn student(&self) -> Option<&StudentProfile> {
        match &self.profile {
            RoleProfile::Student(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn teacher(&self) -> Option<&TeacherProfile> {
        match &self.profile {
            RoleProfile::Teacher(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn set_status(&mut self, status: AccountStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn rename(&mut self, name: PersonName, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }

    /// Replace the student attachment; fails for non-students.
    pub fn replace_student_profile(
        &mut self,
        profile: StudentProfile,
        now: DateTime<Utc>,
    ) -> Result<(), RoleMismatch> {
        match &mut self.profile {
            RoleProfile::Student(current) => {
                *current = profile;
                self.updated_at = now;
                Ok(())
            }
            other => Err(RoleMismatch {
                expected: Role::Student,
                actual: other.role(),
            }),
        }
    }

    /// Replace the teacher attachment; fails for non-teachers.
    pub fn replace_teacher_profile(
        &mut self,
        profile: TeacherProfile,
        now: DateTime<Utc>,
    ) -> Result<(), RoleMismatch> {
        match &mut self.profile {
            RoleProfile::Teacher(current) => {
                *current = profile;
                self.updated_at = now;
                Ok(())
            }
            other => Err(RoleMismatch {
                expected: Role::Teacher,
                actual: other.role(),
            }),
        }
    }
}
