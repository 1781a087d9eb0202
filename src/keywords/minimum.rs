//! Validator for the `minimum` keyword.
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
pub(crate) struct Minimum {
    bound: Number,
}

impl Minimum {
    pub(crate) fn new(bound: Number) -> Minimum {
        Minimum { bound }
    }
}

impl Assertion for Minimum {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::Number(number) => matches!(
                compare(number.value(), &self.bound),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("minimum", "instance.problem.minimum", location)
            .param("bound", self.bound.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("minimum", "instance.problem.not.minimum", location)
            .param("bound", self.bound.clone())
    }
}

impl Keyword for Minimum {
    fn name(&self) -> &str {
        "minimum"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty.is(InstanceType::Number)
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("minimum".to_string(), Value::Number(self.bound.clone()));
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
        Value::Number(bound) => ok(Minimum::new(bound.clone())),
        _ => fail(BuildError::WrongType {
            keyword: "minimum",
            expected: "a number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("0", true)]
    #[test_case("0.5", true)]
    #[test_case("-0.5", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"minimum": 0}), instance);
        assert_eq!(valid, expected);
    }
}
