//! Assignments attached to a course and the submissions recorded against them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CourseId, UserId};

/// Validation errors raised while building assignment values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentValidationError {
    EmptyTitle,
    EmptyDescription,
    NonPositivePoints(i32),
}

impl fmt::Display for AssignmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::EmptyDescription => write!(f, "description is required"),
            Self::NonPositivePoints(points) => {
                write!(f, "total points must be positive, got {points}")
            }
        }
    }
}

impl std::error::Error for AssignmentValidationError {}

impl AssignmentValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyDescription => "description",
            Self::NonPositivePoints(_) => "totalPoints",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(i64);

impl AssignmentId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(i64);

impl SubmissionId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Validated assignment fields awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    total_points: i32,
}

impl AssignmentDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        total_points: i32,
    ) -> Result<Self, AssignmentValidationError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(AssignmentValidationError::EmptyTitle);
        }
        let description = description.into().trim().to_owned();
        if description.is_empty() {
            return Err(AssignmentValidationError::EmptyDescription);
        }
        if total_points <= 0 {
            return Err(AssignmentValidationError::NonPositivePoints(total_points));
        }
        Ok(Self {
            title,
            description,
            due_date,
            total_points,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn total_points(&self) -> i32 {
        self.total_points
    }

    pub fn into_assignment(
        self,
        id: AssignmentId,
        course_id: CourseId,
        created_at: DateTime<Utc>,
    ) -> Assignment {
        Assignment {
            id,
            course_id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            total_points: self.total_points,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Stored assignment; never moves to another course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub total_points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload. The file reference is an opaque string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub assignment_id: AssignmentId,
    pub student_id: UserId,
    pub file_reference: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Stored submission; at most one per (assignment, student).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: SubmissionId,
    pub assignment_id: AssignmentId,
    pub student_id: UserId,
    pub submitted_at: DateTime<Utc>,
    pub file_reference: Option<String>,
    pub grade: Option<i32>,
    pub feedback: Option<String>,
}

impl Submission {
    pub fn from_new(id: SubmissionId, new: NewSubmission) -> Self {
        Self {
            id,
            assignment_id: new.assignment_id,
            student_id: new.student_id,
            submitted_at: new.submitted_at,
            file_reference: new.file_reference,
            grade: None,
            feedback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 23, 59, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn points_must_be_positive(#[case] points: i32) {
        let err = AssignmentDraft::new("Lab 1", "Linked lists", due(), points)
            .expect_err("points validated");
        assert_eq!(err, AssignmentValidationError::NonPositivePoints(points));
        assert_eq!(err.field(), "totalPoints");
    }

    #[rstest]
    fn titles_are_trimmed_and_required() {
        let draft = AssignmentDraft::new("  Lab 1 ", "Linked lists", due(), 10).expect("valid");
        assert_eq!(draft.title(), "Lab 1");
        assert_eq!(
            AssignmentDraft::new(" ", "x", due(), 10),
            Err(AssignmentValidationError::EmptyTitle)
        );
    }

    #[rstest]
    fn new_submissions_start_ungraded() {
        let submission = Submission::from_new(
            SubmissionId::new(1),
            NewSubmission {
                assignment_id: AssignmentId::new(4),
                student_id: UserId::new(9),
                file_reference: Some("uploads/lab1.zip".to_owned()),
                submitted_at: due(),
            },
        );
        assert!(submission.grade.is_none());
        assert!(submission.feedback.is_none());
    }
}
