use std::fmt;

/// User-facing message attached to every error envelope
///
/// Fixed members render a short neutral sentence that is safe to show to an
/// end user. The JSON variants carry schema-derived values (field names,
/// type names, byte offsets) and never raw driver text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMessage {
    /// Empty message used when there is no error to describe
    Default,
    Unknown,
    UnknownDb,
    NotFound,
    AlreadyExists,
    Duplicate,
    ForeignKey,
    MissingField,
    CheckViolation,
    TooLong,
    InvalidFormat,
    OutOfRange,
    Timeout,
    Unavailable,
    Conflict,
    /// A row references a parent row that does not exist
    MissingReference,
    /// A JSON value did not match the type of the target field
    InvalidField {
        field: String,
        expected: String,
        got: String,
    },
    /// The request body is not valid JSON
    MalformedJson { position: usize },
    /// The request body carries a field the target type does not know
    UnknownField { name: String },
    /// The request body ended before the JSON document was complete
    TruncatedJson,
}

impl UserMessage {
    /// Stable machine-readable code for this message
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Unknown => "UNKNOWN",
            Self::UnknownDb => "UNKNOWN_DB",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Duplicate => "DUPLICATE",
            Self::ForeignKey => "FOREIGN_KEY",
            Self::MissingField => "MISSING_FIELD",
            Self::CheckViolation => "CHECK_VIOLATION",
            Self::TooLong => "TOO_LONG",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Timeout => "TIMEOUT",
            Self::Unavailable => "UNAVAILABLE",
            Self::Conflict => "CONFLICT",
            Self::MissingReference => "MISSING_REFERENCE",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::MalformedJson { .. } => "MALFORMED_JSON",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::TruncatedJson => "TRUNCATED_JSON",
        }
    }

    /// Display text for members that carry no values
    ///
    /// Returns `None` for the JSON variants, whose text is assembled from
    /// their fields.
    pub const fn fixed_text(&self) -> Option<&'static str> {
        let text = match self {
            Self::Default => "",
            Self::Unknown => "An unexpected error occurred.",
            Self::UnknownDb => "A database error occurred.",
            Self::NotFound => "No entry found.",
            // Distinct codes, shared copy
            Self::AlreadyExists | Self::Duplicate => "This record already exists.",
            Self::ForeignKey => "This record is linked to another and cannot be deleted.",
            Self::MissingField => "A required field was left blank.",
            Self::CheckViolation => "One or more values violate a database rule.",
            Self::TooLong => "One or more values are too long.",
            Self::InvalidFormat => "Invalid data format.",
            Self::OutOfRange => "A value is outside the allowed range.",
            Self::Timeout => "The request took too long to complete. Please try again.",
            Self::Unavailable => "The system is temporarily unavailable. Please try again later.",
            Self::Conflict => "The resource is currently locked or being modified.",
            Self::MissingReference => "This record references another that doesn't exist.",
            Self::TruncatedJson => "Incomplete or truncated JSON input.",
            Self::InvalidField { .. } | Self::MalformedJson { .. } | Self::UnknownField { .. } => return None,
        };

        Some(text)
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidField { field, expected, got } => {
                write!(f, "Invalid value for field '{field}' — expected {expected} but got {got}.")
            }
            Self::MalformedJson { position } => write!(f, "Malformed JSON near position {position}."),
            Self::UnknownField { name } => write!(f, "Unknown field {name}."),
            other => f.write_str(other.fixed_text().unwrap_or_default()),
        }
    }
}
