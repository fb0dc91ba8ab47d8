//! Shared Diesel error classification for the campus repositories.
//!
//! Every repository port exposes the same four failure shapes, so adapters
//! classify a Diesel error once and hand the result to the port's
//! constructors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Unique constraints and the wire field each one guards.
const UNIQUE_FIELDS: &[(&str, &str)] = &[
    ("users_email_key", "email"),
    ("students_student_number_key", "studentId"),
    ("teachers_teacher_number_key", "teacherId"),
    ("courses_code_key", "code"),
    ("student_courses_pkey", "enrollment"),
    ("submissions_assignment_student_key", "submission"),
];

/// Classified failure, independent of the port error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    Connection(String),
    /// Unique violation on the field named by the constraint.
    Duplicate(&'static str),
    Query(String),
}

pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

fn field_for_constraint(constraint: Option<&str>) -> &'static str {
    constraint
        .and_then(|name| {
            UNIQUE_FIELDS
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, field)| *field)
        })
        .unwrap_or("record")
}

pub(crate) fn classify(error: DieselError, operation: &str) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => debug!(
            ?kind,
            constraint = ?info.constraint_name(),
            message = info.message(),
            %operation,
            "diesel operation failed"
        ),
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFailure::Duplicate(field_for_constraint(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => StoreFailure::Query("record not found".to_owned()),
        other => StoreFailure::Query(format!("{operation}: {other}")),
    }
}

/// Generates `map_pool_error`, `map_read_error` and `map_write_error` for a
/// port error type declared with `define_port_error!`.
///
/// Write failures other than connection loss and unique violations surface as
/// `Transaction`, since every write runs inside one.
macro_rules! port_error_mapping {
    ($error:ty) => {
        fn map_pool_error(error: $crate::outbound::persistence::pool::PoolError) -> $error {
            <$error>::connection($crate::outbound::persistence::diesel_error_mapping::pool_message(
                error,
            ))
        }

        /// Reads never insert, so a unique violation here is a query fault.
        fn map_read_error(error: diesel::result::Error, operation: &str) -> $error {
            use $crate::outbound::persistence::diesel_error_mapping::{StoreFailure, classify};
            match classify(error, operation) {
                StoreFailure::Connection(message) => <$error>::connection(message),
                StoreFailure::Duplicate(field) => {
                    <$error>::query(format!("{operation}: unexpected unique violation on {field}"))
                }
                StoreFailure::Query(message) => <$error>::query(message),
            }
        }

        /// `value` is the candidate value reported when a unique index fires.
        fn map_write_error(
            error: diesel::result::Error,
            operation: &str,
            value: impl Fn(&str) -> String,
        ) -> $error {
            use $crate::outbound::persistence::diesel_error_mapping::{StoreFailure, classify};
            match classify(error, operation) {
                StoreFailure::Connection(message) => <$error>::connection(message),
                StoreFailure::Duplicate(field) => <$error>::duplicate(field, value(field)),
                StoreFailure::Query(message) => <$error>::transaction(message),
            }
        }
    };
}

pub(crate) use port_error_mapping;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("courses_code_key"), "code")]
    #[case(Some("students_student_number_key"), "studentId")]
    #[case(Some("student_courses_pkey"), "enrollment")]
    #[case(Some("something_else"), "record")]
    #[case(None, "record")]
    fn constraints_name_their_field(#[case] constraint: Option<&str>, #[case] field: &str) {
        assert_eq!(field_for_constraint(constraint), field);
    }

    #[rstest]
    fn unique_violations_become_duplicates() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );
        assert_eq!(classify(error, "insert"), StoreFailure::Duplicate("record"));
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("gone".to_owned()),
        );
        assert!(matches!(
            classify(error, "select"),
            StoreFailure::Connection(_)
        ));
    }

    #[rstest]
    fn missing_rows_are_query_failures() {
        assert_eq!(
            classify(DieselError::NotFound, "select"),
            StoreFailure::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(pool_message(PoolError::checkout("timed out")), "timed out");
    }

    mod generated {
        use super::*;
        use crate::domain::ports::CourseRepositoryError;

        port_error_mapping!(CourseRepositoryError);

        fn code_violation() -> DieselError {
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key".to_owned()),
            )
        }

        #[rstest]
        fn reads_never_report_a_placeholder_duplicate() {
            let error = map_read_error(code_violation(), "list courses");
            assert!(
                matches!(&error, CourseRepositoryError::Query { message } if message.contains("list courses")),
                "unexpected {error:?}"
            );
        }

        #[rstest]
        fn writes_report_the_candidate_value() {
            let error = map_write_error(code_violation(), "create course", |_| "CS101".to_owned());
            assert!(matches!(
                error,
                CourseRepositoryError::Duplicate { field, value } if field == "record" && value == "CS101"
            ));
        }

        #[rstest]
        fn other_write_failures_roll_back() {
            let error = map_write_error(DieselError::RollbackTransaction, "delete course", |_| {
                String::new()
            });
            assert!(matches!(error, CourseRepositoryError::Transaction { .. }));
        }

        #[rstest]
        fn pool_failures_are_connection_errors() {
            let error = map_pool_error(PoolError::checkout("timed out"));
            assert!(matches!(error, CourseRepositoryError::Connection { .. }));
        }
    }
}
