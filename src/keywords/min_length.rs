//! Validator for the `minLength` keyword.
use super::helpers::non_negative_integer;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Assertion, AssertionEval, Eval};
use crate::events::{Event, Location};
use crate::instance_type::InstanceType;
use crate::problem::Problem;
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub(crate) struct MinLength {
    bound: u64,
}

impl MinLength {
    pub(crate) fn new(bound: u64) -> MinLength {
        MinLength { bound }
    }
}

impl Assertion for MinLength {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::String(value) => value.chars().count() as u64 >= self.bound,
            _ => true,
        }
    }

    fn problem(&self, event: &Event, location: Location) -> Problem {
        let actual = match event {
            Event::String(value) => value.chars().count() as u64,
            _ => 0,
        };
        Problem::new("minLength", "instance.problem.minLength", location)
            .param("bound", self.bound)
            .param("actual", actual)
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("minLength", "instance.problem.not.minLength", location)
            .param("bound", self.bound)
    }
}

impl Keyword for MinLength {
    fn name(&self) -> &str {
        "minLength"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("minLength".to_string(), Value::from(self.bound));
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
    match non_negative_integer(schema) {
        Some(bound) => ok(MinLength::new(bound)),
        None => fail(BuildError::WrongType {
            keyword: "minLength",
            expected: "a non-negative integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("\"ab\"", true)]
    #[test_case("\"a\"", false)]
    #[test_case("\"🇯🇵\"", true; "two code point flag")]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"minLength": 2}), instance);
        assert_eq!(valid, expected);
    }
}
