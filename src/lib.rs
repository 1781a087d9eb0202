//! # jsonsieve
//!
//! A crate for performing streaming JSON Schema validation. A schema is
//! compiled once into a keyword graph; instances are validated as event
//! streams, without ever materializing them as trees, while every event is
//! forwarded to the caller unchanged.
//!
//! Supports JSON Schema Draft-07.
//!
//! ## Example:
//!
//! ```rust
//! use jsonsieve::{Schema, validate_str};
//! use serde_json::json;
//!
//! fn main() -> Result<(), jsonsieve::BuildError> {
//!     let schema = Schema::compile(&json!({"maxLength": 5}))?;
//!     let problems = validate_str(&schema, "\"streaming\"").expect("well-formed JSON");
//!     for problem in &problems {
//!         println!("{}", problem);
//!     }
//!     assert_eq!(problems.len(), 1);
//!     Ok(())
//! }
//! ```
#![warn(
    clippy::doc_markdown,
    clippy::redundant_closure,
    clippy::explicit_iter_loop,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::print_stdout,
    clippy::trivially_copy_pass_by_ref,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
mod builder;
mod error;
mod eval;
mod events;
mod format;
mod instance_type;
mod keywords;
mod messages;
mod metaschema;
mod problem;
mod reader;
mod resolver;
mod schemas;
mod tokenizer;
mod validator;

pub use builder::SchemaBuilder;
pub use error::BuildError;
pub use eval::Verdict;
pub use events::{Event, EventSource, JsonNumber, Location, ParsedEvent, SliceSource, SyntaxError};
pub use format::FormatRegistry;
pub use instance_type::InstanceType;
pub use messages::Locale;
pub use metaschema::meta_schema;
pub use problem::{Problem, ProblemSink};
pub use schemas::{draft_from_schema, draft_from_url, CompileOptions, Draft, Schema};
pub use tokenizer::Tokenizer;
pub use validator::{validate, validate_str, ValidatingSource, ValueReader};

use serde_json::Value;

/// A shortcut for validating a JSON text against a schema document.
/// The draft is detected from `$schema`, defaulting to Draft-07.
///
/// ```rust
/// use jsonsieve::is_valid;
/// use serde_json::json;
///
/// assert!(is_valid(&json!({"maxLength": 5}), "\"foo\""));
/// ```
///
/// This function panics if the schema is invalid or the instance is not
/// well-formed JSON.
#[must_use]
pub fn is_valid(schema: &Value, instance: &str) -> bool {
    let compiled = Schema::compile(schema).expect("Invalid schema");
    validate_str(&compiled, instance)
        .expect("Malformed instance")
        .is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_valid() {
        let schema = json!({"minLength": 5});
        assert!(is_valid(&schema, "\"foobar\""));
        assert!(!is_valid(&schema, "\"foo\""));
    }
}
