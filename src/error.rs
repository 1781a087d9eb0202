//! Errors raised while building a schema.
//!
//! Malformed schemas are fatal and reported through `BuildError`; they are a
//! different class of failure from validation problems, which are collected
//! into sinks and never abort the engine.
use std::fmt;

/// The error type that happens when the input schema is not valid.
#[derive(Debug)]
pub enum BuildError {
    /// The document node where a schema was expected is not an object or boolean.
    NotASchema,
    /// A keyword value has the wrong JSON type.
    WrongType {
        keyword: &'static str,
        expected: &'static str,
    },
    /// A keyword requires a non-empty array and received an empty one.
    EmptyArray { keyword: &'static str },
    /// A keyword requires unique entries and received a duplicate.
    DuplicateEntry { keyword: &'static str },
    /// The same keyword was added twice through the builder.
    DuplicateKeyword { keyword: String },
    /// A numeric keyword is out of its allowed range, e.g. `multipleOf <= 0`.
    OutOfRange {
        keyword: &'static str,
        constraint: &'static str,
    },
    /// A regular expression failed to compile.
    InvalidRegex { pattern: String },
    /// `format` named an attribute the registry does not know (strict mode).
    UnknownFormat { format: String },
    /// `type` named something outside the closed instance type set.
    UnknownType { name: String },
    /// `$id` or `$ref` does not parse as a URI reference.
    InvalidUri { reference: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::NotASchema => write!(f, "a schema must be an object or a boolean"),
            BuildError::WrongType { keyword, expected } => {
                write!(f, "'{}' must be {}", keyword, expected)
            }
            BuildError::EmptyArray { keyword } => {
                write!(f, "'{}' must be a non-empty array", keyword)
            }
            BuildError::DuplicateEntry { keyword } => {
                write!(f, "'{}' entries must be unique", keyword)
            }
            BuildError::DuplicateKeyword { keyword } => {
                write!(f, "keyword '{}' was specified more than once", keyword)
            }
            BuildError::OutOfRange {
                keyword,
                constraint,
            } => write!(f, "'{}' must be {}", keyword, constraint),
            BuildError::InvalidRegex { pattern } => {
                write!(f, "'{}' is not a valid regular expression", pattern)
            }
            BuildError::UnknownFormat { format } => {
                write!(f, "unknown format attribute '{}'", format)
            }
            BuildError::UnknownType { name } => write!(f, "unknown instance type '{}'", name),
            BuildError::InvalidUri { reference } => {
                write!(f, "'{}' is not a valid URI reference", reference)
            }
        }
    }
}

impl std::error::Error for BuildError {}

impl From<regex::Error> for BuildError {
    fn from(error: regex::Error) -> Self {
        let pattern = match error {
            regex::Error::Syntax(s) => s,
            _ => String::new(),
        };
        BuildError::InvalidRegex { pattern }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            BuildError::OutOfRange {
                keyword: "multipleOf",
                constraint: "strictly greater than 0",
            }
            .to_string(),
            "'multipleOf' must be strictly greater than 0"
        );
        assert_eq!(
            BuildError::EmptyArray { keyword: "enum" }.to_string(),
            "'enum' must be a non-empty array"
        );
    }
}
