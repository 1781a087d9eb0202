//! Validator for the `exclusiveMinimum` keyword.
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
pub(crate) struct ExclusiveMinimum {
    bound: Number,
}

impl ExclusiveMinimum {
    pub(crate) fn new(bound: Number) -> ExclusiveMinimum {
        ExclusiveMinimum { bound }
    }
}

impl Assertion for ExclusiveMinimum {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::Number(number) => {
                compare(number.value(), &self.bound) == Some(Ordering::Greater)
            }
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("exclusiveMinimum", "instance.problem.exclusiveMinimum", location)
            .param("bound", self.bound.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new(
            "exclusiveMinimum",
            "instance.problem.not.exclusiveMinimum",
            location,
        )
        .param("bound", self.bound.clone())
    }
}

impl Keyword for ExclusiveMinimum {
    fn name(&self) -> &str {
        "exclusiveMinimum"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty.is(InstanceType::Number)
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("exclusiveMinimum".to_string(), Value::Number(self.bound.clone()));
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
        Value::Number(bound) => ok(ExclusiveMinimum::new(bound.clone())),
        _ => fail(BuildError::WrongType {
            keyword: "exclusiveMinimum",
            expected: "a number",
        }),
    }
}
