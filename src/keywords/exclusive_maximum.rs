//! Validator for the `exclusiveMaximum` keyword.
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
pub(crate) struct ExclusiveMaximum {
    bound: Number,
}

impl ExclusiveMaximum {
    pub(crate) fn new(bound: Number) -> ExclusiveMaximum {
        ExclusiveMaximum { bound }
    }
}

impl Assertion for ExclusiveMaximum {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::Number(number) => {
                compare(number.value(), &self.bound) == Some(Ordering::Less)
            }
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("exclusiveMaximum", "instance.problem.exclusiveMaximum", location)
            .param("bound", self.bound.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new(
            "exclusiveMaximum",
            "instance.problem.not.exclusiveMaximum",
            location,
        )
        .param("bound", self.bound.clone())
    }
}

impl Keyword for ExclusiveMaximum {
    fn name(&self) -> &str {
        "exclusiveMaximum"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty.is(InstanceType::Number)
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("exclusiveMaximum".to_string(), Value::Number(self.bound.clone()));
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
        Value::Number(bound) => ok(ExclusiveMaximum::new(bound.clone())),
        _ => fail(BuildError::WrongType {
            keyword: "exclusiveMaximum",
            expected: "a number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("4.999", true)]
    #[test_case("5", false)]
    #[test_case("5.5", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"exclusiveMaximum": 5}), instance);
        assert_eq!(valid, expected);
    }
}
