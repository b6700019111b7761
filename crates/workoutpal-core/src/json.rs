use serde::de::DeserializeOwned;
use serde_json::error::Category;
use thiserror::Error;

/// Failure to decode a JSON request body
///
/// Keeps the path of the value that failed (e.g. `sets[2].reps`) and the
/// byte offset into the body where the parser stopped, neither of which
/// `serde_json::Error` reports on its own.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct JsonError {
    path: Option<String>,
    offset: usize,
    #[source]
    source: serde_json::Error,
}

impl JsonError {
    fn new(body: &[u8], path: Option<String>, source: serde_json::Error) -> Self {
        let offset = byte_offset(body, source.line(), source.column());
        Self { path, offset, source }
    }

    /// Path of the offending value, if the failure happened below the root
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Number of body bytes consumed before the failure
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn inner(&self) -> &serde_json::Error {
        &self.source
    }

    pub fn category(&self) -> Category {
        self.source.classify()
    }
}

/// Decode a request body into `T`
///
/// Trailing non-whitespace after the document is rejected.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, JsonError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);

    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = path_name(&err.path().to_string());
        JsonError::new(body, path, err.into_inner())
    })?;

    deserializer.end().map_err(|err| JsonError::new(body, None, err))?;

    Ok(value)
}

/// `serde_path_to_error` renders the root as `.` and an unknown position as `?`
pub(crate) fn path_name(path: &str) -> Option<String> {
    match path {
        "" | "." | "?" => None,
        other => Some(other.to_owned()),
    }
}

/// `deserialize_with` helpers for `jiff` date and time fields
///
/// Parse failures are reported with a fixed prefix so the classifier can
/// tell them apart from other data errors once serde has flattened them to
/// text.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct NewSchedule {
///     #[serde(deserialize_with = "json::datetime::deserialize")]
///     time_slot: jiff::Timestamp,
/// }
/// ```
pub mod datetime {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};

    pub(crate) const INVALID: &str = "invalid date/time: ";

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr<Err = jiff::Error>,
    {
        parse(&String::deserialize(deserializer)?)
    }

    fn parse<T, E>(raw: &str) -> Result<T, E>
    where
        T: FromStr<Err = jiff::Error>,
        E: serde::de::Error,
    {
        raw.parse().map_err(|err| E::custom(format_args!("{INVALID}{err}")))
    }

    /// Same as [`deserialize`] for optional fields; `null` maps to `None`
    pub mod option {
        use super::{Deserialize, Deserializer, FromStr};

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            D: Deserializer<'de>,
            T: FromStr<Err = jiff::Error>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw))
                .transpose()
        }
    }
}

/// Convert serde_json's 1-based line and column into a byte count
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }

    let line_start: usize = body
        .split(|byte| *byte == b'\n')
        .take(line - 1)
        .map(|line| line.len() + 1)
        .sum();

    (line_start + column).min(body.len())
}
