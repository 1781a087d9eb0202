//! Validator for the `pattern` keyword.
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Assertion, AssertionEval, Eval};
use crate::events::{Event, Location};
use crate::instance_type::InstanceType;
use crate::problem::Problem;
use crate::reader::ReaderContext;
use regex::Regex;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub(crate) fn new(pattern: &str) -> Result<Pattern, BuildError> {
        // Compiled eagerly so an invalid pattern is a build error, not a
        // runtime surprise.
        let regex = Regex::new(pattern).map_err(|_| BuildError::InvalidRegex {
            pattern: pattern.to_string(),
        })?;
        Ok(Pattern {
            source: pattern.to_string(),
            regex,
        })
    }
}

impl Assertion for Pattern {
    fn test(&self, event: &Event) -> bool {
        match event {
            // Unanchored find, as ECMA-262 regexes behave.
            Event::String(value) => self.regex.is_match(value),
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("pattern", "instance.problem.pattern", location)
            .param("pattern", self.source.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("pattern", "instance.problem.not.pattern", location)
            .param("pattern", self.source.clone())
    }
}

impl Keyword for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("pattern".to_string(), Value::String(self.source.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty == InstanceType::String {
            Some(AssertionEval::boxed(self.clone(), affirmative))
        } else {
            None
        }
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    match schema {
        Value::String(pattern) => match Pattern::new(pattern) {
            Ok(keyword) => ok(keyword),
            Err(error) => fail(error),
        },
        _ => fail(BuildError::WrongType {
            keyword: "pattern",
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("\"subsequence\"", true; "find is unanchored")]
    #[test_case("\"seq\"", true)]
    #[test_case(r#""qes""#, false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"pattern": "seq"}), instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn rejects_invalid_regex() {
        assert!(Schema::compile(&json!({"pattern": "("})).is_err());
    }
}
