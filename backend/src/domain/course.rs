//! Courses and their weekly meeting schedules.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TeacherNumber, UserId};

/// Validation errors raised while building course values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    InvalidCode,
    EmptyName,
    EmptyDescription,
    EmptyRoom,
    StartNotBeforeEnd { start: NaiveTime, end: NaiveTime },
    UnknownDay(String),
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCode => write!(
                f,
                "course code should be in format like 'CS101' or 'MATH2001'"
            ),
            Self::EmptyName => write!(f, "course name is required"),
            Self::EmptyDescription => write!(f, "course description is required"),
            Self::EmptyRoom => write!(f, "room is required"),
            Self::StartNotBeforeEnd { start, end } => {
                write!(f, "start time {start} must be before end time {end}")
            }
            Self::UnknownDay(raw) => write!(f, "unknown day of week '{raw}'"),
        }
    }
}

impl std::error::Error for CourseValidationError {}

impl CourseValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidCode => "code",
            Self::EmptyName => "name",
            Self::EmptyDescription => "description",
            Self::EmptyRoom => "room",
            Self::StartNotBeforeEnd { .. } => "startTime",
            Self::UnknownDay(_) => "day",
        }
    }
}

/// Surrogate key of a course row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(i64);

impl CourseId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surrogate key of a schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(i64);

impl ScheduleId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Unique course code: two to four capitals followed by three or four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "CS101")]
pub struct CourseCode(String);

static COURSE_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn course_code_regex() -> &'static Regex {
    COURSE_CODE_RE.get_or_init(|| {
        Regex::new(r"^[A-Z]{2,4}\d{3,4}$")
            .unwrap_or_else(|error| panic!("course code regex failed to compile: {error}"))
    })
}

impl CourseCode {
    pub fn new(raw: impl Into<String>) -> Result<Self, CourseValidationError> {
        let raw = raw.into();
        if !course_code_regex().is_match(&raw) {
            return Err(CourseValidationError::InvalidCode);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Day on which a schedule entry meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
            Self::Saturday => "SATURDAY",
            Self::Sunday => "SUNDAY",
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONDAY" => Ok(Self::Monday),
            "TUESDAY" => Ok(Self::Tuesday),
            "WEDNESDAY" => Ok(Self::Wednesday),
            "THURSDAY" => Ok(Self::Thursday),
            "FRIDAY" => Ok(Self::Friday),
            "SATURDAY" => Ok(Self::Saturday),
            "SUNDAY" => Ok(Self::Sunday),
            other => Err(CourseValidationError::UnknownDay(other.to_owned())),
        }
    }
}

/// Validated schedule entry awaiting persistence under a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    day: DayOfWeek,
    start_time: NaiveTime,
    end_time: NaiveTime,
    room: String,
}

impl ScheduleDraft {
    pub fn new(
        day: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        room: impl Into<String>,
    ) -> Result<Self, CourseValidationError> {
        if start_time >= end_time {
            return Err(CourseValidationError::StartNotBeforeEnd {
                start: start_time,
                end: end_time,
            });
        }
        let room = room.into();
        let room = room.trim();
        if room.is_empty() {
            return Err(CourseValidationError::EmptyRoom);
        }
        Ok(Self {
            day,
            start_time,
            end_time,
            room: room.to_owned(),
        })
    }

    pub fn day(&self) -> DayOfWeek {
        self.day
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// Attach the draft to its owning course.
    pub fn into_schedule(self, id: ScheduleId, course_id: CourseId) -> Schedule {
        Schedule {
            id,
            course_id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
        }
    }
}

/// Stored weekly meeting; belongs to exactly one course for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub course_id: CourseId,
    pub day: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
}

impl Schedule {
    /// Same meeting slot and room, ignoring identity.
    pub fn same_slot(&self, draft: &ScheduleDraft) -> bool {
        self.day == draft.day
            && self.start_time == draft.start_time
            && self.end_time == draft.end_time
            && self.room == draft.room
    }
}

/// Teacher reference carried by a course: the user id and public number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTeacher {
    pub id: UserId,
    pub number: TeacherNumber,
}

fn required_text(
    raw: String,
    error: CourseValidationError,
) -> Result<String, CourseValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Descriptive fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetails {
    pub name: String,
    pub code: CourseCode,
    pub description: String,
}

impl CourseDetails {
    pub fn new(
        name: impl Into<String>,
        code: CourseCode,
        description: impl Into<String>,
    ) -> Result<Self, CourseValidationError> {
        Ok(Self {
            name: required_text(name.into(), CourseValidationError::EmptyName)?,
            code,
            description: required_text(description.into(), CourseValidationError::EmptyDescription)?,
        })
    }
}

/// Insert payload: the course row and its schedule children.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub details: CourseDetails,
    pub teacher: CourseTeacher,
    pub schedules: Vec<ScheduleDraft>,
    pub created_at: DateTime<Utc>,
}

/// Update payload. `schedules: None` leaves the schedule set untouched.
#[derive(Debug, Clone)]
pub struct CourseChanges {
    pub id: CourseId,
    pub details: CourseDetails,
    pub teacher: CourseTeacher,
    pub schedules: Option<Vec<ScheduleDraft>>,
    pub updated_at: DateTime<Utc>,
}

/// Materialised course with its schedules.
///
/// Enrolled students are a projection of the enrollment ledger and are not
/// stored on the course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub details: CourseDetails,
    pub teacher: CourseTeacher,
    pub schedules: Vec<Schedule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn code(&self) -> &CourseCode {
        &self.details.code
    }
}
