//! JSON request and response bodies for the campus API.
//!
//! Requests arrive with optional string fields so that a missing field is
//! reported per field rather than as an opaque deserialisation failure.
//! Responses flatten the shared user fields into the role-specific views.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{
    FieldName, parse_rfc3339_timestamp, parse_time_of_day, rejected, rejected_login, require,
    require_value,
};
use crate::domain::ports::{CourseForm, StudentRegistration, TeacherRegistration};
use crate::domain::{
    AccountStatus, Assignment, AssignmentDraft, AuthenticatedUser, Course, CourseCode,
    CourseDetails, DayOfWeek, Email, Error, Password, PersonName, Role, Schedule, ScheduleDraft,
    StudentNumber, StudentProfile, Submission, TeacherNumber, TeacherProfile, User,
};

const TIME_FORMAT: &str = "%H:%M:%S";

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "admin@campus.test")]
    pub email: String,
    pub password: String,
}

/// Identity established by a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<AuthenticatedUser> for SessionUserDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id.get(),
            name: user.name.into(),
            email: user.email.into(),
            role: user.role,
        }
    }
}

/// Fields shared by every user view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().get(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            status: user.status(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDto {
    pub id: i64,
    pub day: DayOfWeek,
    #[schema(example = "09:00:00")]
    pub start_time: String,
    #[schema(example = "10:30:00")]
    pub end_time: String,
    pub room: String,
}

impl From<&Schedule> for ScheduleDto {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.get(),
            day: schedule.day,
            start_time: format_time(schedule.start_time),
            end_time: format_time(schedule.end_time),
            room: schedule.room.clone(),
        }
    }
}

/// Course view. `teacherId` is the teacher's public number.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: i64,
    pub name: String,
    #[schema(example = "CS101")]
    pub code: String,
    pub description: String,
    #[schema(example = "T1004")]
    pub teacher_id: String,
    pub schedules: Vec<ScheduleDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Course> for CourseDto {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.get(),
            name: course.details.name.clone(),
            code: course.details.code.to_string(),
            description: course.details.description.clone(),
            teacher_id: course.teacher.number.to_string(),
            schedules: course.schedules.iter().map(ScheduleDto::from).collect(),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

pub(crate) fn course_list(courses: &[Course]) -> Vec<CourseDto> {
    courses.iter().map(CourseDto::from).collect()
}

fn profile_missing(user: &User, expected: Role) -> Error {
    Error::internal(format!(
        "user {} is a {}, not a {expected}",
        user.id(),
        user.role()
    ))
}

/// Student view; `enrolledCourses` is present on single-record reads.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    #[serde(flatten)]
    pub user: UserDto,
    #[schema(example = "S0042")]
    pub student_id: String,
    pub program: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_courses: Option<Vec<CourseDto>>,
}

impl StudentDto {
    pub(crate) fn new(user: &User, courses: Option<&[Course]>) -> Result<Self, Error> {
        let profile = user
            .student()
            .ok_or_else(|| profile_missing(user, Role::Student))?;
        Ok(Self {
            user: UserDto::from(user),
            student_id: profile.student_number().to_string(),
            program: profile.program().to_owned(),
            year: profile.year().to_owned(),
            enrolled_courses: courses.map(course_list),
        })
    }
}

/// Teacher view; `assignedCourses` is present on single-record reads.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDto {
    #[serde(flatten)]
    pub user: UserDto,
    #[schema(example = "T1004")]
    pub teacher_id: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_courses: Option<Vec<CourseDto>>,
}

impl TeacherDto {
    pub(crate) fn new(user: &User, courses: Option<&[Course]>) -> Result<Self, Error> {
        let profile = user
            .teacher()
            .ok_or_else(|| profile_missing(user, Role::Teacher))?;
        Ok(Self {
            user: UserDto::from(user),
            teacher_id: profile.teacher_number().to_string(),
            department: profile.department().to_owned(),
            assigned_courses: courses.map(course_list),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub total_points: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Assignment> for AssignmentDto {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id.get(),
            course_id: assignment.course_id.get(),
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            due_date: assignment.due_date,
            total_points: assignment.total_points,
            created_at: assignment.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDto {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub file_reference: Option<String>,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
}

impl From<Submission> for SubmissionDto {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id.get(),
            assignment_id: submission.assignment_id.get(),
            student_id: submission.student_id.get(),
            submitted_at: submission.submitted_at,
            file_reference: submission.file_reference,
            grade: submission.grade,
            feedback: submission.feedback,
        }
    }
}

fn person_name(first: Option<String>, last: Option<String>) -> Result<PersonName, Error> {
    let first = require(first, FieldName::new("firstName"))?;
    let last = require(last, FieldName::new("lastName"))?;
    PersonName::from_parts(&first, &last).map_err(rejected)
}

fn account(email: Option<String>, password: Option<String>) -> Result<(Email, Password), Error> {
    let email = Email::new(require(email, FieldName::new("email"))?).map_err(rejected)?;
    let password = Password::chosen(&password.unwrap_or_default()).map_err(rejected_login)?;
    Ok((email, password))
}

fn student_profile(
    number: Option<String>,
    program: Option<String>,
    year: Option<String>,
) -> Result<StudentProfile, Error> {
    let number =
        StudentNumber::new(require(number, FieldName::new("studentId"))?).map_err(rejected)?;
    StudentProfile::new(
        number,
        require(program, FieldName::new("program"))?,
        require(year, FieldName::new("year"))?,
    )
    .map_err(rejected)
}

fn teacher_profile(
    number: Option<String>,
    department: Option<String>,
) -> Result<TeacherProfile, Error> {
    let number =
        TeacherNumber::new(require(number, FieldName::new("teacherId"))?).map_err(rejected)?;
    TeacherProfile::new(number, require(department, FieldName::new("department"))?)
        .map_err(rejected)
}

/// Student registration and update body. Email and password are ignored on
/// update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "S0042")]
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub year: Option<String>,
}

impl StudentRequest {
    pub(crate) fn into_registration(self) -> Result<StudentRegistration, Error> {
        let name = person_name(self.first_name, self.last_name)?;
        let (email, password) = account(self.email, self.password)?;
        let profile = student_profile(self.student_id, self.program, self.year)?;
        Ok(StudentRegistration {
            name,
            email,
            password,
            profile,
        })
    }

    pub(crate) fn into_update(self) -> Result<(PersonName, StudentProfile), Error> {
        let name = person_name(self.first_name, self.last_name)?;
        let profile = student_profile(self.student_id, self.program, self.year)?;
        Ok((name, profile))
    }
}

/// Teacher registration and update body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "T1004")]
    pub teacher_id: Option<String>,
    pub department: Option<String>,
}

impl TeacherRequest {
    pub(crate) fn into_registration(self) -> Result<TeacherRegistration, Error> {
        let name = person_name(self.first_name, self.last_name)?;
        let (email, password) = account(self.email, self.password)?;
        let profile = teacher_profile(self.teacher_id, self.department)?;
        Ok(TeacherRegistration {
            name,
            email,
            password,
            profile,
        })
    }

    pub(crate) fn into_update(self) -> Result<(PersonName, TeacherProfile), Error> {
        let name = person_name(self.first_name, self.last_name)?;
        let profile = teacher_profile(self.teacher_id, self.department)?;
        Ok((name, profile))
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub day: Option<String>,
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    #[schema(example = "10:30")]
    pub end_time: Option<String>,
    pub room: Option<String>,
}

impl ScheduleRequest {
    fn into_draft(self) -> Result<ScheduleDraft, Error> {
        let day = require(self.day, FieldName::new("day"))?
            .parse::<DayOfWeek>()
            .map_err(rejected)?;
        let start = parse_time_of_day(
            &require(self.start_time, FieldName::new("startTime"))?,
            FieldName::new("startTime"),
        )?;
        let end = parse_time_of_day(
            &require(self.end_time, FieldName::new("endTime"))?,
            FieldName::new("endTime"),
        )?;
        ScheduleDraft::new(day, start, end, require(self.room, FieldName::new("room"))?)
            .map_err(rejected)
    }
}

/// Course create and update body. Omitting `schedules` on update keeps the
/// stored set; supplying it replaces the set.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub name: Option<String>,
    #[schema(example = "CS101")]
    pub code: Option<String>,
    pub description: Option<String>,
    #[schema(example = "T1004")]
    pub teacher_id: Option<String>,
    pub schedules: Option<Vec<ScheduleRequest>>,
}

impl TryFrom<CourseRequest> for CourseForm {
    type Error = Error;

    fn try_from(request: CourseRequest) -> Result<Self, Self::Error> {
        let code = CourseCode::new(require(request.code, FieldName::new("code"))?)
            .map_err(rejected)?;
        let details = CourseDetails::new(
            require(request.name, FieldName::new("name"))?,
            code,
            require(request.description, FieldName::new("description"))?,
        )
        .map_err(rejected)?;
        let teacher = TeacherNumber::new(require(request.teacher_id, FieldName::new("teacherId"))?)
            .map_err(rejected)?;
        let schedules = request
            .schedules
            .map(|entries| {
                entries
                    .into_iter()
                    .map(ScheduleRequest::into_draft)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Self {
            details,
            teacher,
            schedules,
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2026-10-01T23:59:00Z")]
    pub due_date: Option<String>,
    pub total_points: Option<i32>,
}

impl TryFrom<AssignmentRequest> for AssignmentDraft {
    type Error = Error;

    fn try_from(request: AssignmentRequest) -> Result<Self, Self::Error> {
        let due = parse_rfc3339_timestamp(
            &require(request.due_date, FieldName::new("dueDate"))?,
            FieldName::new("dueDate"),
        )?;
        AssignmentDraft::new(
            require(request.title, FieldName::new("title"))?,
            require(request.description, FieldName::new("description"))?,
            due,
            require_value(request.total_points, FieldName::new("totalPoints"))?,
        )
        .map_err(rejected)
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub status: Option<String>,
}

impl StatusRequest {
    pub(crate) fn into_status(self) -> Result<AccountStatus, Error> {
        require(self.status, FieldName::new("status"))?
            .parse()
            .map_err(rejected)
    }
}

/// Submission body. Admins may name the student; everyone else submits as
/// themselves.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub student_id: Option<i64>,
    pub file_reference: Option<String>,
}
