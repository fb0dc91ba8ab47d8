//! Translation of driven-port failures into domain [`Error`]s.
//!
//! Every store reports the same four failure shapes; this module gives them a
//! single HTTP-facing meaning so services never decide it ad hoc.

use tracing::warn;

use super::Error;
use super::ports::{
    CourseRepositoryError, CredentialHashError, EnrollmentRepositoryError, UserPersistenceError,
};

macro_rules! store_error_mapper {
    ($fn_name:ident, $error:ident, $label:literal) => {
        pub(crate) fn $fn_name(error: $error) -> Error {
            match error {
                $error::Connection { message } => {
                    Error::service_unavailable(format!("{} unavailable: {message}", $label))
                }
                $error::Query { message } => {
                    Error::internal(format!("{} error: {message}", $label))
                }
                $error::Duplicate { field, value } => {
                    warn!(%field, %value, store = $label, "unique constraint rejected write");
                    Error::duplicate(&field, value)
                }
                $error::Transaction { message } => {
                    Error::transaction_failed(format!("{} transaction rolled back: {message}", $label))
                }
            }
        }
    };
}

store_error_mapper!(map_user_error, UserPersistenceError, "user store");
store_error_mapper!(map_course_error, CourseRepositoryError, "course store");
store_error_mapper!(map_enrollment_error, EnrollmentRepositoryError, "enrollment store");

pub(crate) fn map_hash_error(error: CredentialHashError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::duplicate("email", "a@b.test"), ErrorCode::Conflict)]
    #[case(UserPersistenceError::transaction("aborted"), ErrorCode::TransactionFailed)]
    fn user_store_failures_map_to_codes(
        #[case] error: UserPersistenceError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_user_error(error).code(), expected);
    }

    #[rstest]
    fn duplicates_keep_field_and_value() {
        let error = map_course_error(CourseRepositoryError::duplicate("code", "CS101"));
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "code");
        assert_eq!(details["value"], "CS101");
    }

    #[rstest]
    fn enrollment_rollbacks_are_transaction_failures() {
        let error = map_enrollment_error(EnrollmentRepositoryError::transaction("deadlock"));
        assert_eq!(error.code(), ErrorCode::TransactionFailed);
    }
}
