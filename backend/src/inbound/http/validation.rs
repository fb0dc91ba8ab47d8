//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive as loosely typed DTOs; these helpers turn missing or
//! malformed fields into `invalid_request` errors whose `details` name the
//! field and a stable code.

use chrono::{DateTime, NaiveTime, Utc};
use serde_json::json;

use crate::domain::{
    AssignmentValidationError, CourseValidationError, Error, LoginValidationError,
    UserValidationError,
};

/// Validation codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    InvalidTimestamp,
    InvalidTime,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidValue => "invalid_value",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidTime => "invalid_time",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, message: impl Into<String>, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Domain validation failures that know which wire field they concern.
pub(crate) trait FieldRejection: std::fmt::Display {
    fn field(&self) -> &'static str;
}

macro_rules! field_rejection {
    ($($error:ty),+ $(,)?) => {
        $(
            impl FieldRejection for $error {
                fn field(&self) -> &'static str {
                    <$error>::field(self)
                }
            }
        )+
    };
}

field_rejection!(
    UserValidationError,
    CourseValidationError,
    AssignmentValidationError
);

pub(crate) fn rejected(error: impl FieldRejection) -> Error {
    field_error(error.field(), error.to_string(), ErrorCode::InvalidValue)
}

/// Login errors carry their own stable codes.
pub(crate) fn rejected_login(error: LoginValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

/// Unwrap a required field, rejecting absent or blank values.
pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| {
            let field = field.as_str();
            field_error(
                field,
                format!("missing required field: {field}"),
                ErrorCode::MissingField,
            )
        })
}

pub(crate) fn require_value<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| {
        let field = field.as_str();
        field_error(
            field,
            format!("missing required field: {field}"),
            ErrorCode::MissingField,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let field = field.as_str();
            field_error(
                field,
                format!("{field} must be an RFC 3339 timestamp"),
                ErrorCode::InvalidTimestamp,
            )
        })
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub(crate) fn parse_time_of_day(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            let field = field.as_str();
            field_error(
                field,
                format!("{field} must be a time of day such as 09:30"),
                ErrorCode::InvalidTime,
            )
        })
}
