//! Translation of database engine failures
//!
//! Postgres reports constraint and connectivity failures with a SQLSTATE
//! code. The code alone picks the user message and status, except for
//! `23503` where the direction of the foreign-key violation has to be read
//! from the detail and message text.

use std::borrow::Cow;
use std::sync::LazyLock;

use http::StatusCode;
use regex::Regex;
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

use crate::{Classification, UserMessage};

/// A database engine error detached from its connection
///
/// `sqlx::Error` is neither `Clone` nor constructible outside the driver,
/// so repositories that need to keep or re-raise an engine failure copy
/// its code, message and detail into this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("database error {code}: {message}")]
pub struct DatabaseError {
    code: String,
    message: String,
    detail: Option<String>,
}

impl DatabaseError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
        }
    }

    /// Attach the engine's detail line (e.g. `Key (user_id)=(7) is not present in table "users".`)
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<&PgDatabaseError> for DatabaseError {
    fn from(err: &PgDatabaseError) -> Self {
        Self {
            code: err.code().to_owned(),
            message: err.message().to_owned(),
            detail: err.detail().map(ToOwned::to_owned),
        }
    }
}

/// Borrowed view over whichever driver error was found in an error chain
#[derive(Debug, Clone)]
pub struct DriverFailure<'a> {
    pub code: Option<Cow<'a, str>>,
    pub message: &'a str,
    pub detail: Option<&'a str>,
}

impl<'a> From<&'a DatabaseError> for DriverFailure<'a> {
    fn from(err: &'a DatabaseError) -> Self {
        Self {
            code: Some(Cow::Borrowed(err.code())),
            message: err.message(),
            detail: err.detail(),
        }
    }
}

impl<'a> From<&'a (dyn sqlx::error::DatabaseError + 'static)> for DriverFailure<'a> {
    fn from(err: &'a (dyn sqlx::error::DatabaseError + 'static)) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            detail: err.try_downcast_ref::<PgDatabaseError>().and_then(PgDatabaseError::detail),
        }
    }
}

/// Map a driver failure to a user message and status
///
/// An absent failure maps to the generic database message.
pub fn classify_driver(failure: Option<&DriverFailure<'_>>) -> Classification {
    let Some(failure) = failure else {
        return Classification::new(UserMessage::UnknownDb, StatusCode::INTERNAL_SERVER_ERROR);
    };

    match failure.code.as_deref() {
        Some("23503") => classify_foreign_key(failure),
        Some(code) => classify_code(code),
        None => Classification::new(UserMessage::UnknownDb, StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Map a SQLSTATE code to a user message and status
pub fn classify_code(code: &str) -> Classification {
    let (message, status) = match code {
        "23505" => (UserMessage::Duplicate, StatusCode::BAD_REQUEST),
        "23502" => (UserMessage::MissingField, StatusCode::UNPROCESSABLE_ENTITY),
        "23514" => (UserMessage::CheckViolation, StatusCode::UNPROCESSABLE_ENTITY),
        "23503" => (UserMessage::ForeignKey, StatusCode::CONFLICT),
        "22P02" | "22007" => (UserMessage::InvalidFormat, StatusCode::UNPROCESSABLE_ENTITY),
        "22001" => (UserMessage::TooLong, StatusCode::UNPROCESSABLE_ENTITY),
        "22003" => (UserMessage::OutOfRange, StatusCode::UNPROCESSABLE_ENTITY),
        "23P01" | "40001" | "40P01" | "55P03" => (UserMessage::Conflict, StatusCode::CONFLICT),
        "08006" | "08001" | "53300" | "57P01" | "57P02" => (UserMessage::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        _ => (UserMessage::UnknownDb, StatusCode::INTERNAL_SERVER_ERROR),
    };

    Classification::new(message, status)
}

/// Tell apart the two causes of a `23503` foreign-key violation
///
/// An insert or update that points at a missing parent is a client input
/// problem (422). A delete or update blocked by existing children is a
/// conflict (409), which is also the fallback when neither phrase matches.
fn classify_foreign_key(failure: &DriverFailure<'_>) -> Classification {
    let message = failure.message.to_lowercase();
    let text = format!("{} {message}", failure.detail.unwrap_or_default()).to_lowercase();

    if text.contains("is not present in table") || message.starts_with("insert or update") {
        return Classification::new(UserMessage::MissingReference, StatusCode::UNPROCESSABLE_ENTITY);
    }

    Classification::new(UserMessage::ForeignKey, StatusCode::CONFLICT)
}

static FK_NOT_PRESENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Key \((?P<col>[^)]+)\)=\([^)]+\) is not present in table "(?P<reftable>[^"]+)""#)
        .expect("must be valid regex")
});

/// Column and parent table named by a missing-parent violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingReference<'a> {
    pub column: &'a str,
    pub table: &'a str,
}

impl<'a> MissingReference<'a> {
    /// Extract the offending column and referenced table from a `23503` detail line
    ///
    /// The user message never includes these values; they are for operators.
    pub fn parse(detail: &'a str) -> Option<Self> {
        let captures = FK_NOT_PRESENT.captures(detail)?;

        Some(Self {
            column: captures.name("col")?.as_str(),
            table: captures.name("reftable")?.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(err: &DatabaseError) -> Classification {
        classify_driver(Some(&DriverFailure::from(err)))
    }

    #[test]
    fn unique_violation_is_duplicate() {
        let err = DatabaseError::new("23505", "duplicate key value violates unique constraint \"users_email_key\"");
        let result = classify(&err);

        assert_eq!(result.message, UserMessage::Duplicate);
        assert_eq!(result.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_null_violation_is_missing_field() {
        let err = DatabaseError::new("23502", "null value in column \"email\" violates not-null constraint");
        let result = classify(&err);

        assert_eq!(result.message, UserMessage::MissingField);
        assert_eq!(result.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn code_table() {
        let cases = [
            ("23514", UserMessage::CheckViolation, StatusCode::UNPROCESSABLE_ENTITY),
            ("23P01", UserMessage::Conflict, StatusCode::CONFLICT),
            ("22P02", UserMessage::InvalidFormat, StatusCode::UNPROCESSABLE_ENTITY),
            ("22001", UserMessage::TooLong, StatusCode::UNPROCESSABLE_ENTITY),
            ("22003", UserMessage::OutOfRange, StatusCode::UNPROCESSABLE_ENTITY),
            ("22007", UserMessage::InvalidFormat, StatusCode::UNPROCESSABLE_ENTITY),
            ("40001", UserMessage::Conflict, StatusCode::CONFLICT),
            ("40P01", UserMessage::Conflict, StatusCode::CONFLICT),
            ("55P03", UserMessage::Conflict, StatusCode::CONFLICT),
            ("08006", UserMessage::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            ("08001", UserMessage::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            ("53300", UserMessage::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            ("57P01", UserMessage::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            ("57P02", UserMessage::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (code, message, status) in cases {
            let result = classify_code(code);
            assert_eq!(result.message, message, "code {code}");
            assert_eq!(result.status, status, "code {code}");
        }
    }

    #[test]
    fn unlisted_code_is_unknown_db() {
        let result = classify(&DatabaseError::new("99999", "something odd"));

        assert_eq!(result.message, UserMessage::UnknownDb);
        assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn absent_failure_is_unknown_db() {
        let result = classify_driver(None);

        assert_eq!(result.message, UserMessage::UnknownDb);
        assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_code_is_unknown_db() {
        let failure = DriverFailure {
            code: None,
            message: "connection reset",
            detail: None,
        };

        assert_eq!(classify_driver(Some(&failure)).message, UserMessage::UnknownDb);
    }

    #[test]
    fn missing_parent_from_detail() {
        let err = DatabaseError::new(
            "23503",
            "insert or update on table \"posts\" violates foreign key constraint \"posts_user_id_fkey\"",
        )
        .with_detail("Key (user_id)=(42) is not present in table \"users\".");
        let result = classify(&err);

        assert_eq!(result.message, UserMessage::MissingReference);
        assert_eq!(result.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_parent_from_message_prefix_only() {
        let err = DatabaseError::new("23503", "INSERT or update on table \"goals\" violates foreign key constraint");
        let result = classify(&err);

        assert_eq!(result.message, UserMessage::MissingReference);
        assert_eq!(result.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_parent_message_is_same_when_detail_unparseable() {
        let parsed = DatabaseError::new("23503", "violates foreign key constraint")
            .with_detail("Key (user_id)=(42) is not present in table \"users\".");
        let unparsed =
            DatabaseError::new("23503", "violates foreign key constraint").with_detail("row is not present in table");

        assert!(MissingReference::parse(unparsed.detail().unwrap_or_default()).is_none());
        assert_eq!(classify(&parsed), classify(&unparsed));
    }

    #[test]
    fn blocked_delete_is_foreign_key_conflict() {
        let err = DatabaseError::new(
            "23503",
            "update or delete on table \"goals\" violates foreign key constraint \"routines_goal_id_fkey\" on table \"routines\"",
        )
        .with_detail("Key (id)=(3) is still referenced from table \"routines\".");
        let result = classify(&err);

        assert_eq!(result.message, UserMessage::ForeignKey);
        assert_eq!(result.status, StatusCode::CONFLICT);
    }

    #[test]
    fn unrecognised_foreign_key_text_falls_back_to_conflict() {
        let result = classify(&DatabaseError::new("23503", "foreign key violation"));

        assert_eq!(result.message, UserMessage::ForeignKey);
        assert_eq!(result.status, StatusCode::CONFLICT);
    }

    #[test]
    fn parses_missing_reference_parts() {
        let parts = MissingReference::parse("Key (user_id)=(42) is not present in table \"users\".");

        assert_eq!(
            parts,
            Some(MissingReference {
                column: "user_id",
                table: "users",
            })
        );
    }

    #[test]
    fn user_message_never_contains_detail() {
        let err = DatabaseError::new("23503", "insert or update on table \"posts\"")
            .with_detail("Key (user_id)=(42) is not present in table \"users\".");
        let text = classify(&err).message.to_string();

        assert!(!text.contains("user_id"));
        assert!(!text.contains("users"));
    }
}
