//! Validator for the `maximum` keyword.
use super::helpers::compare;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Assertion, AssertionEval, Eval};
use crate::events::{Event, Location};
use crate::instance_type::InstanceType;
use crate::problem::Problem;
use crate::reader::ReaderContext;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub(crate) struct Maximum {
    bound: Number,
}

impl Maximum {
    pub(crate) fn new(bound: Number) -> Maximum {
        Maximum { bound }
    }
}

impl Assertion for Maximum {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::Number(number) => matches!(
                compare(number.value(), &self.bound),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("maximum", "instance.problem.maximum", location)
            .param("bound", self.bound.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("maximum", "instance.problem.not.maximum", location)
            .param("bound", self.bound.clone())
    }
}

impl Keyword for Maximum {
    fn name(&self) -> &str {
        "maximum"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty.is(InstanceType::Number)
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("maximum".to_string(), Value::Number(self.bound.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty.is(InstanceType::Number) {
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
        Value::Number(bound) => ok(Maximum::new(bound.clone())),
        _ => fail(BuildError::WrongType {
            keyword: "maximum",
            expected: "a number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("100", true)]
    #[test_case("100.0", true)]
    #[test_case("100.5", false)]
    #[test_case("-3", true)]
    #[test_case("\"x\"", true; "strings are unconstrained")]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, problems) = check(&json!({"maximum": 100}), instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }
}
