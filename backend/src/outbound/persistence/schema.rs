//! Diesel table definitions for the campus schema.
//!
//! These must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Shared account fields for every role.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        /// `ADMIN`, `TEACHER` or `STUDENT`; fixed at creation.
        role -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    students (user_id) {
        user_id -> Int8,
        student_number -> Varchar,
        program -> Varchar,
        year -> Varchar,
    }
}

diesel::table! {
    teachers (user_id) {
        user_id -> Int8,
        teacher_number -> Varchar,
        department -> Varchar,
    }
}

diesel::table! {
    courses (id) {
        id -> Int8,
        name -> Varchar,
        code -> Varchar,
        description -> Text,
        teacher_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    schedules (id) {
        id -> Int8,
        course_id -> Int8,
        day -> Varchar,
        start_time -> Time,
        end_time -> Time,
        room -> Varchar,
    }
}

diesel::table! {
    assignments (id) {
        id -> Int8,
        course_id -> Int8,
        title -> Varchar,
        description -> Text,
        due_date -> Timestamptz,
        total_points -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    submissions (id) {
        id -> Int8,
        assignment_id -> Int8,
        student_id -> Int8,
        submitted_at -> Timestamptz,
        file_reference -> Nullable<Text>,
        grade -> Nullable<Int4>,
        feedback -> Nullable<Text>,
    }
}

diesel::table! {
    /// Enrollment join table; the only record of who takes which course.
    student_courses (student_id, course_id) {
        student_id -> Int8,
        course_id -> Int8,
        enrolled_at -> Timestamptz,
    }
}

diesel::joinable!(students -> users (user_id));
diesel::joinable!(teachers -> users (user_id));
diesel::joinable!(courses -> teachers (teacher_id));
diesel::joinable!(schedules -> courses (course_id));
diesel::joinable!(assignments -> courses (course_id));
diesel::joinable!(submissions -> assignments (assignment_id));
diesel::joinable!(submissions -> students (student_id));
diesel::joinable!(student_courses -> courses (course_id));
diesel::joinable!(student_courses -> students (student_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    students,
    teachers,
    courses,
    schedules,
    assignments,
    submissions,
    student_courses,
);
