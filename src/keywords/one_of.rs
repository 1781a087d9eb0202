//! Validator for the `oneOf` keyword.
use super::all_of::compile_list;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::combine::Exclusive;
use crate::eval::{AlwaysFalse, Eval};
use crate::instance_type::InstanceType;
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

/// An exclusive branch must be countable either way: a branch none of whose
/// keywords applies to the instance's type cannot match it, and says so
/// with a type problem.
fn branch_evaluator(schema: &Arc<Schema>, ty: InstanceType) -> Eval {
    if schema.applicable(ty) {
        schema.evaluator(ty, true)
    } else {
        let expected: Vec<Value> = schema
            .constrained_types()
            .iter()
            .map(|t| Value::String(t.to_string()))
            .collect();
        Box::new(
            AlwaysFalse::new("type", "instance.problem.type")
                .param("expected", Value::Array(expected))
                .param("actual", ty.to_string()),
        )
    }
}

#[derive(Debug)]
pub(crate) struct OneOf {
    schemas: Vec<Arc<Schema>>,
}

impl OneOf {
    pub(crate) fn new(schemas: Vec<Arc<Schema>>) -> Result<OneOf, BuildError> {
        if schemas.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "oneOf" });
        }
        Ok(OneOf { schemas })
    }
}

impl Keyword for OneOf {
    fn name(&self) -> &str {
        "oneOf"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let branches = self.schemas.iter().map(|schema| schema.to_json()).collect();
        map.insert("oneOf".to_string(), Value::Array(branches));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        // Every branch participates: match counting rules out pruning.
        let children: Vec<Eval> = self
            .schemas
            .iter()
            .map(|schema| branch_evaluator(schema, ty))
            .collect();
        Some(Exclusive::boxed(children, affirmative))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match compile_list("oneOf", schema, context).and_then(OneOf::new) {
        Ok(keyword) => ok(keyword),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    fn schema() -> serde_json::Value {
        json!({"oneOf": [{"type": "integer"}, {"multipleOf": 5}]})
    }

    #[test_case("3", true; "only the first")]
    #[test_case("2.5", false; "matches neither")]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&schema(), instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn too_many_matches() {
        let (valid, problems) = check(&schema(), "10");
        assert!(!valid);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message_key(), "instance.problem.oneOf.many");
        assert_eq!(problems[0].branches().len(), 2);
    }

    #[test]
    fn too_few_matches() {
        let (valid, problems) = check(&schema(), "\"x\"");
        assert!(!valid);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message_key(), "instance.problem.oneOf.few");
        assert_eq!(problems[0].branches().len(), 2);
    }
}
