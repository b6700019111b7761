//! Typed checks over an error and every error it wraps
//!
//! Each matcher walks the full `source()` chain, so an error buried under
//! `anyhow` context or a repository wrapper is still recognised.

use std::error::Error;
use std::io;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::error::Category;

use crate::database::{DatabaseError, DriverFailure};
use crate::json::{self, JsonError};

type PathError = serde_path_to_error::Error<serde_json::Error>;

/// Iterate over an error and its sources, outermost first
pub fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&err| err.source())
}

fn any_in_chain<E: Error + 'static>(err: &(dyn Error + 'static), predicate: impl Fn(&E) -> bool) -> bool {
    chain(err).any(|err| err.downcast_ref::<E>().is_some_and(&predicate))
}

/// First database engine failure in the chain
pub fn driver_failure<'a>(err: &'a (dyn Error + 'static)) -> Option<DriverFailure<'a>> {
    chain(err).find_map(|err| {
        if let Some(db) = err.downcast_ref::<DatabaseError>() {
            return Some(DriverFailure::from(db));
        }

        if let Some(sqlx::Error::Database(db)) = err.downcast_ref::<sqlx::Error>() {
            return Some(DriverFailure::from(db.as_ref()));
        }

        err.downcast_ref::<Box<dyn sqlx::error::DatabaseError>>()
            .map(|db| DriverFailure::from(db.as_ref()))
    })
}

/// A JSON decode failure found in the chain, with whatever position
/// information the wrapping type kept
#[derive(Debug)]
pub struct JsonFailure<'a> {
    inner: &'a serde_json::Error,
    path: Option<String>,
    offset: Option<usize>,
}

impl JsonFailure<'_> {
    /// Parser message without the trailing ` at line N column M`
    fn message(&self) -> String {
        static POSITION: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r" at line \d+ column \d+$").expect("must be valid regex"));

        POSITION.replace(&self.inner.to_string(), "").into_owned()
    }

    /// Field path, type and value of a type mismatch
    pub fn type_mismatch(&self) -> Option<(String, String, String)> {
        static MISMATCH: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^invalid (?:type|value): (?P<got>.+), expected (?P<expected>.+)$")
                .expect("must be valid regex")
        });

        if self.inner.classify() != Category::Data {
            return None;
        }

        let message = self.message();
        let captures = MISMATCH.captures(&message)?;
        let field = self.path.clone().unwrap_or_else(|| "(unknown field)".to_owned());

        Some((
            field,
            captures["expected"].to_owned(),
            describe_unexpected(&captures["got"]),
        ))
    }

    pub fn is_missing_field(&self) -> bool {
        self.inner.classify() == Category::Data && self.message().starts_with("missing field ")
    }

    /// Position of a syntax error
    ///
    /// Exact byte offset when decoded through [`crate::json::decode`],
    /// otherwise the parser's column, which equals the offset for
    /// single-line bodies.
    pub fn syntax_position(&self) -> Option<usize> {
        (self.inner.classify() == Category::Syntax).then(|| self.offset.unwrap_or_else(|| self.inner.column()))
    }

    /// A date or time field that failed to parse through [`json::datetime`]
    pub fn is_datetime(&self) -> bool {
        self.inner.classify() == Category::Data && self.message().starts_with(json::datetime::INVALID)
    }

    pub fn is_eof(&self) -> bool {
        self.inner.classify() == Category::Eof
    }
}

/// Keep the kind of an unexpected value but not string contents, which
/// come straight from the request body
fn describe_unexpected(got: &str) -> String {
    if got.starts_with("string ") {
        "string".to_owned()
    } else if got.starts_with("character ") {
        "character".to_owned()
    } else {
        got.to_owned()
    }
}

/// First JSON decode failure in the chain
pub fn json_failure<'a>(err: &'a (dyn Error + 'static)) -> Option<JsonFailure<'a>> {
    chain(err).find_map(|err| {
        if let Some(json) = err.downcast_ref::<JsonError>() {
            return Some(JsonFailure {
                inner: json.inner(),
                path: json.path().map(ToOwned::to_owned),
                offset: Some(json.offset()),
            });
        }

        if let Some(json) = err.downcast_ref::<PathError>() {
            return Some(JsonFailure {
                inner: json.inner(),
                path: json::path_name(&json.path().to_string()),
                offset: None,
            });
        }

        err.downcast_ref::<serde_json::Error>().map(|inner| JsonFailure {
            inner,
            path: None,
            offset: None,
        })
    })
}

const UNKNOWN_FIELD_PREFIX: &str = "unknown field ";

/// Name of an unknown JSON field, taken from the error text
///
/// This is a prefix match on rendered text, not a typed check. It looks at
/// the error's own display string first, then at the message of a JSON
/// failure further down the chain.
pub fn unknown_field(text: &str, json: Option<&JsonFailure<'_>>) -> Option<String> {
    let name_from = |text: &str| text.strip_prefix(UNKNOWN_FIELD_PREFIX).map(|rest| field_name(rest).to_owned());

    name_from(text).or_else(|| json.and_then(|json| name_from(&json.message())))
}

/// serde quotes the name in backticks and follows it with the expected
/// fields or `there are no fields`
fn field_name(rest: &str) -> &str {
    if let Some(quoted) = rest.strip_prefix('`')
        && let Some(end) = quoted.find('`')
    {
        return &rest[..end + 2];
    }

    rest.split_once(", ").map_or(rest, |(name, _)| name)
}

/// The body ended before the document was complete
pub fn is_truncated(err: &(dyn Error + 'static), json: Option<&JsonFailure<'_>>) -> bool {
    json.is_some_and(JsonFailure::is_eof)
        || any_in_chain::<io::Error>(err, |io| io.kind() == io::ErrorKind::UnexpectedEof)
}

pub fn is_datetime_parse(err: &(dyn Error + 'static)) -> bool {
    any_in_chain::<jiff::Error>(err, |_| true)
}

/// Any error in the chain whose own text contains `needle`
pub fn mentions(err: &(dyn Error + 'static), needle: &str) -> bool {
    chain(err).any(|err| err.to_string().contains(needle))
}

pub fn is_no_rows(err: &(dyn Error + 'static)) -> bool {
    any_in_chain::<sqlx::Error>(err, |sqlx| matches!(sqlx, sqlx::Error::RowNotFound))
}

pub fn is_deadline_exceeded(err: &(dyn Error + 'static)) -> bool {
    any_in_chain::<tokio::time::error::Elapsed>(err, |_| true)
        || any_in_chain::<io::Error>(err, |io| io.kind() == io::ErrorKind::TimedOut)
}
