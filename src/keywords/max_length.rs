//! Validator for the `maxLength` keyword.
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
pub(crate) struct MaxLength {
    bound: u64,
}

impl MaxLength {
    pub(crate) fn new(bound: u64) -> MaxLength {
        MaxLength { bound }
    }
}

fn code_points(event: &Event) -> Option<u64> {
    match event {
        // Lengths count Unicode scalar values, not code units or bytes.
        Event::String(value) => Some(value.chars().count() as u64),
        _ => None,
    }
}

impl Assertion for MaxLength {
    fn test(&self, event: &Event) -> bool {
        code_points(event).map_or(true, |length| length <= self.bound)
    }

    fn problem(&self, event: &Event, location: Location) -> Problem {
        Problem::new("maxLength", "instance.problem.maxLength", location)
            .param("bound", self.bound)
            .param("actual", code_points(event).unwrap_or(0))
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("maxLength", "instance.problem.not.maxLength", location)
            .param("bound", self.bound)
    }
}

impl Keyword for MaxLength {
    fn name(&self) -> &str {
        "maxLength"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("maxLength".to_string(), Value::from(self.bound));
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
        Some(bound) => ok(MaxLength::new(bound)),
        None => fail(BuildError::WrongType {
            keyword: "maxLength",
            expected: "a non-negative integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("\"fo\"", true)]
    #[test_case("\"foo\"", true)]
    #[test_case("\"fooo\"", false)]
    #[test_case("\"日本語\"", true; "code points not bytes")]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"maxLength": 3}), instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn rejects_negative_bound() {
        assert!(Schema::compile(&json!({"maxLength": -1})).is_err());
    }
}
