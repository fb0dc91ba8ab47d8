//! Table contents and constraint checks for the in-memory store.
//!
//! Every mutating method enforces the same unique and foreign-key rules as
//! the PostgreSQL schema and reports violations as [`StoreFault`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, CascadeStep, Course, CourseChanges, CourseId,
    NewCourse, NewSubmission, NewUser, Role, RoleProfile, Schedule, ScheduleDraft, ScheduleId,
    Submission, SubmissionId, User, UserId,
};

/// Constraint violation or injected failure raised inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFault {
    Duplicate { field: &'static str, value: String },
    MissingReference(String),
    Injected(String),
}

#[derive(Debug, Clone, Copy, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    user_ids: Sequence,
    course_ids: Sequence,
    schedule_ids: Sequence,
    assignment_ids: Sequence,
    submission_ids: Sequence,
    pub users: BTreeMap<UserId, User>,
    pub courses: BTreeMap<CourseId, Course>,
    pub assignments: BTreeMap<AssignmentId, Assignment>,
    pub submissions: BTreeMap<SubmissionId, Submission>,
    pub enrollments: BTreeMap<(UserId, CourseId), DateTime<Utc>>,
}

fn student_number(profile: &RoleProfile) -> Option<&str> {
    match profile {
        RoleProfile::Student(p) => Some(p.student_number().as_str()),
        _ => None,
    }
}

fn teacher_number(profile: &RoleProfile) -> Option<&str> {
    match profile {
        RoleProfile::Teacher(p) => Some(p.teacher_number().as_str()),
        _ => None,
    }
}

impl Tables {
    fn check_user_unique(
        &self,
        own: Option<UserId>,
        email: Option<&str>,
        profile: &RoleProfile,
    ) -> Result<(), StoreFault> {
        let students = student_number(profile);
        let teachers = teacher_number(profile);
        for other in self.users.values().filter(|u| Some(u.id()) != own) {
            if email.is_some_and(|email| other.email().as_str() == email) {
                return Err(StoreFault::Duplicate {
                    field: "email",
                    value: email.unwrap_or_default().to_owned(),
                });
            }
            if students.is_some() && student_number(other.profile()) == students {
                return Err(StoreFault::Duplicate {
                    field: "studentId",
                    value: students.unwrap_or_default().to_owned(),
                });
            }
            if teachers.is_some() && teacher_number(other.profile()) == teachers {
                return Err(StoreFault::Duplicate {
                    field: "teacherId",
                    value: teachers.unwrap_or_default().to_owned(),
                });
            }
        }
        Ok(())
    }

    pub fn insert_user(&mut self, new: NewUser) -> Result<User, StoreFault> {
        self.check_user_unique(None, Some(new.email.as_str()), &new.profile)?;
        let user = User::from_new(UserId::new(self.user_ids.next()), new);
        self.users.insert(user.id(), user.clone());
        Ok(user)
    }

    pub fn replace_user(&mut self, user: &User) -> Result<bool, StoreFault> {
        let Some(stored) = self.users.get(&user.id()) else {
            return Ok(false);
        };
        if stored.role() != user.role() || stored.email() != user.email() {
            return Err(StoreFault::MissingReference(format!(
                "user {} role and email are fixed",
                user.id()
            )));
        }
        self.check_user_unique(Some(user.id()), None, user.profile())?;
        self.users.insert(user.id(), user.clone());
        Ok(true)
    }

    fn check_course(&self, own: Option<CourseId>, course: &Course) -> Result<(), StoreFault> {
        let code = course.code().as_str();
        if self
            .courses
            .values()
            .any(|other| Some(other.id) != own && other.code().as_str() == code)
        {
            return Err(StoreFault::Duplicate {
                field: "code",
                value: code.to_owned(),
            });
        }
        match self.users.get(&course.teacher.id) {
            Some(user) if user.role() == Role::Teacher => Ok(()),
            _ => Err(StoreFault::MissingReference(format!(
                "teacher {} does not exist",
                course.teacher.id
            ))),
        }
    }

    fn materialise_schedules(
        &mut self,
        course: CourseId,
        drafts: Vec<ScheduleDraft>,
    ) -> Vec<Schedule> {
        drafts
            .into_iter()
            .map(|draft| draft.into_schedule(ScheduleId::new(self.schedule_ids.next()), course))
            .collect()
    }

    /// Insert the course row; schedules are attached by [`Self::attach_schedules`].
    pub fn insert_course(&mut self, new: &NewCourse) -> Result<CourseId, StoreFault> {
        let id = CourseId::new(self.course_ids.next());
        let course = Course {
            id,
            details: new.details.clone(),
            teacher: new.teacher.clone(),
            schedules: Vec::new(),
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.check_course(None, &course)?;
        self.courses.insert(id, course);
        Ok(id)
    }

    pub fn attach_schedules(
        &mut self,
        course: CourseId,
        drafts: Vec<ScheduleDraft>,
    ) -> Result<(), StoreFault> {
        let schedules = self.materialise_schedules(course, drafts);
        let stored = self.courses.get_mut(&course).ok_or_else(|| {
            StoreFault::MissingReference(format!("course {course} does not exist"))
        })?;
        stored.schedules.extend(schedules);
        Ok(())
    }

    pub fn apply_course_changes(&mut self, changes: CourseChanges) -> Result<bool, StoreFault> {
        let Some(stored) = self.courses.get(&changes.id) else {
            return Ok(false);
        };
        let mut updated = stored.clone();
        updated.details = changes.details;
        updated.teacher = changes.teacher;
        updated.updated_at = changes.updated_at;
        self.check_course(Some(changes.id), &updated)?;
        if let Some(drafts) = changes.schedules {
            updated.schedules = self.materialise_schedules(changes.id, drafts);
        }
        self.courses.insert(changes.id, updated);
        Ok(true)
    }

    /// Course with its teacher's current public number.
    pub fn course_view(&self, id: CourseId) -> Option<Course> {
        let mut course = self.courses.get(&id)?.clone();
        if let Some(profile) = self.users.get(&course.teacher.id).and_then(User::teacher) {
            course.teacher.number = profile.teacher_number().clone();
        }
        Some(course)
    }

    pub fn run_cascade_step(&mut self, step: CascadeStep, course: CourseId) -> usize {
        match step {
            CascadeStep::UnlinkEnrollments => {
                let before = self.enrollments.len();
                self.enrollments.retain(|(_, enrolled), _| *enrolled != course);
                before - self.enrollments.len()
            }
            CascadeStep::DeleteSubmissions => {
                let assignments = &self.assignments;
                let before = self.submissions.len();
                self.submissions.retain(|_, submission| {
                    assignments
                        .get(&submission.assignment_id)
                        .is_none_or(|assignment| assignment.course_id != course)
                });
                before - self.submissions.len()
            }
            CascadeStep::DeleteAssignments => {
                let before = self.assignments.len();
                self.assignments
                    .retain(|_, assignment| assignment.course_id != course);
                before - self.assignments.len()
            }
            CascadeStep::DeleteSchedules => self
                .courses
                .get_mut(&course)
                .map(|stored| std::mem::take(&mut stored.schedules).len())
                .unwrap_or_default(),
            CascadeStep::DeleteCourse => usize::from(self.courses.remove(&course).is_some()),
        }
    }

    pub fn insert_assignment(
        &mut self,
        course: CourseId,
        draft: AssignmentDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Assignment, StoreFault> {
        if !self.courses.contains_key(&course) {
            return Err(StoreFault::MissingReference(format!(
                "course {course} does not exist"
            )));
        }
        let id = AssignmentId::new(self.assignment_ids.next());
        let assignment = draft.into_assignment(id, course, created_at);
        self.assignments.insert(id, assignment.clone());
        Ok(assignment)
    }

    pub fn insert_enrollment(
        &mut self,
        student: UserId,
        course: CourseId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreFault> {
        let is_student = self
            .users
            .get(&student)
            .is_some_and(|user| user.role() == Role::Student);
        if !is_student || !self.courses.contains_key(&course) {
            return Err(StoreFault::MissingReference(format!(
                "enrollment {student}:{course} references a missing row"
            )));
        }
        if self.enrollments.contains_key(&(student, course)) {
            return Err(StoreFault::Duplicate {
                field: "enrollment",
                value: format!("{student}:{course}"),
            });
        }
        self.enrollments.insert((student, course), at);
        Ok(())
    }

    pub fn insert_submission(&mut self, new: NewSubmission) -> Result<Submission, StoreFault> {
        if !self.assignments.contains_key(&new.assignment_id) {
            return Err(StoreFault::MissingReference(format!(
                "assignment {} does not exist",
                new.assignment_id
            )));
        }
        if self.submissions.values().any(|existing| {
            existing.assignment_id == new.assignment_id && existing.student_id == new.student_id
        }) {
            return Err(StoreFault::Duplicate {
                field: "submission",
                value: format!("{}:{}", new.assignment_id, new.student_id),
            });
        }
        let submission = Submission::from_new(SubmissionId::new(self.submission_ids.next()), new);
        self.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }
}
