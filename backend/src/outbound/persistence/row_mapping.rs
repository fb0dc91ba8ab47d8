//! Row loading and conversion shared by the Diesel repositories.
//!
//! Fetch functions only run SQL and return raw rows; the `*_from_rows`
//! functions are pure and rebuild validated domain records, reporting
//! corrupt rows as strings the caller wraps in its port error.

use std::collections::{BTreeMap, HashMap};

use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::{
    AccountStatus, Assignment, AssignmentId, Course, CourseCode, CourseDetails, CourseId,
    CourseTeacher, CredentialHash, DayOfWeek, Email, NewUser, PersonName, Role, RoleProfile,
    Schedule, ScheduleId, StudentNumber, StudentProfile, Submission, SubmissionId, TeacherNumber,
    TeacherProfile, User, UserId,
};

use super::models::{
    AssignmentRow, CourseRow, ScheduleRow, StudentRow, SubmissionRow, TeacherRow, UserRow,
};
use super::schema::{schedules, students, teachers};

/// A user row with whichever profile row belongs to it.
pub(crate) struct UserRows {
    pub user: UserRow,
    pub student: Option<StudentRow>,
    pub teacher: Option<TeacherRow>,
}

/// A course row with its schedules and its teacher's public number.
pub(crate) struct CourseRows {
    pub course: CourseRow,
    pub schedules: Vec<ScheduleRow>,
    pub teacher_number: Option<String>,
}

pub(crate) async fn fetch_profiles(
    conn: &mut AsyncPgConnection,
    users: Vec<UserRow>,
) -> QueryResult<Vec<UserRows>> {
    let ids: Vec<i64> = users.iter().map(|row| row.id).collect();
    let mut student_rows: HashMap<i64, StudentRow> = students::table
        .filter(students::user_id.eq_any(ids.clone()))
        .select(StudentRow::as_select())
        .load::<StudentRow>(conn)
        .await?
        .into_iter()
        .map(|row| (row.user_id, row))
        .collect();
    let mut teacher_rows: HashMap<i64, TeacherRow> = teachers::table
        .filter(teachers::user_id.eq_any(ids))
        .select(TeacherRow::as_select())
        .load::<TeacherRow>(conn)
        .await?
        .into_iter()
        .map(|row| (row.user_id, row))
        .collect();

    Ok(users
        .into_iter()
        .map(|user| UserRows {
            student: student_rows.remove(&user.id),
            teacher: teacher_rows.remove(&user.id),
            user,
        })
        .collect())
}

pub(crate) async fn fetch_course_children(
    conn: &mut AsyncPgConnection,
    courses: Vec<CourseRow>,
) -> QueryResult<Vec<CourseRows>> {
    let ids: Vec<i64> = courses.iter().map(|row| row.id).collect();
    let teacher_ids: Vec<i64> = courses.iter().map(|row| row.teacher_id).collect();

    let mut by_course: BTreeMap<i64, Vec<ScheduleRow>> = BTreeMap::new();
    let schedule_rows = schedules::table
        .filter(schedules::course_id.eq_any(ids))
        .order(schedules::id.asc())
        .select(ScheduleRow::as_select())
        .load::<ScheduleRow>(conn)
        .await?;
    for row in schedule_rows {
        by_course.entry(row.course_id).or_default().push(row);
    }

    let numbers: HashMap<i64, String> = teachers::table
        .filter(teachers::user_id.eq_any(teacher_ids))
        .select((teachers::user_id, teachers::teacher_number))
        .load::<(i64, String)>(conn)
        .await?
        .into_iter()
        .collect();

    Ok(courses
        .into_iter()
        .map(|course| CourseRows {
            schedules: by_course.remove(&course.id).unwrap_or_default(),
            teacher_number: numbers.get(&course.teacher_id).cloned(),
            course,
        })
        .collect())
}

fn corrupt(entity: &str, id: i64, detail: impl std::fmt::Display) -> String {
    format!("stored {entity} {id} is invalid: {detail}")
}

pub(crate) fn user_from_rows(rows: UserRows) -> Result<User, String> {
    let UserRows {
        user,
        student,
        teacher,
    } = rows;
    let id = user.id;
    let role: Role = user.role.parse().map_err(|err| corrupt("user", id, err))?;
    let profile = match (role, student, teacher) {
        (Role::Admin, _, _) => RoleProfile::Admin,
        (Role::Student, Some(row), _) => {
            let number =
                StudentNumber::new(row.student_number).map_err(|err| corrupt("user", id, err))?;
            RoleProfile::Student(
                StudentProfile::new(number, row.program, row.year)
                    .map_err(|err| corrupt("user", id, err))?,
            )
        }
        (Role::Teacher, _, Some(row)) => {
            let number =
                TeacherNumber::new(row.teacher_number).map_err(|err| corrupt("user", id, err))?;
            RoleProfile::Teacher(
                TeacherProfile::new(number, row.department)
                    .map_err(|err| corrupt("user", id, err))?,
            )
        }
        (role, _, _) => return Err(corrupt("user", id, format!("missing {role} profile"))),
    };

    let new = NewUser {
        name: PersonName::new(user.name).map_err(|err| corrupt("user", id, err))?,
        email: Email::new(user.email).map_err(|err| corrupt("user", id, err))?,
        credential: CredentialHash::new(user.password_hash),
        status: user
            .status
            .parse::<AccountStatus>()
            .map_err(|err| corrupt("user", id, err))?,
        profile,
        created_at: user.created_at,
    };
    Ok(User::from_new(UserId::new(id), new).with_updated_at(user.updated_at))
}

pub(crate) fn schedule_from_row(row: ScheduleRow) -> Result<Schedule, String> {
    let day: DayOfWeek = row
        .day
        .parse()
        .map_err(|err| corrupt("schedule", row.id, err))?;
    Ok(Schedule {
        id: ScheduleId::new(row.id),
        course_id: CourseId::new(row.course_id),
        day,
        start_time: row.start_time,
        end_time: row.end_time,
        room: row.room,
    })
}

pub(crate) fn course_from_rows(rows: CourseRows) -> Result<Course, String> {
    let CourseRows {
        course,
        schedules,
        teacher_number,
    } = rows;
    let id = course.id;
    let code = CourseCode::new(course.code).map_err(|err| corrupt("course", id, err))?;
    let details = CourseDetails::new(course.name, code, course.description)
        .map_err(|err| corrupt("course", id, err))?;
    let number = teacher_number
        .ok_or_else(|| corrupt("course", id, "teacher has no profile"))
        .and_then(|raw| TeacherNumber::new(raw).map_err(|err| corrupt("course", id, err)))?;
    let schedules = schedules
        .into_iter()
        .map(schedule_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Course {
        id: CourseId::new(id),
        details,
        teacher: CourseTeacher {
            id: UserId::new(course.teacher_id),
            number,
        },
        schedules,
        created_at: course.created_at,
        updated_at: course.updated_at,
    })
}

pub(crate) fn assignment_from_row(row: AssignmentRow) -> Assignment {
    Assignment {
        id: AssignmentId::new(row.id),
        course_id: CourseId::new(row.course_id),
        title: row.title,
        description: row.description,
        due_date: row.due_date,
        total_points: row.total_points,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub(crate) fn submission_from_row(row: SubmissionRow) -> Submission {
    Submission {
        id: SubmissionId::new(row.id),
        assignment_id: AssignmentId::new(row.assignment_id),
        student_id: UserId::new(row.student_id),
        submitted_at: row.submitted_at,
        file_reference: row.file_reference,
        grade: row.grade,
        feedback: row.feedback,
    }
}
