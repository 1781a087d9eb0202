//! Validator for the `anyOf` keyword.
use super::all_of::compile_list;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::combine::{Conjunction, Disjunction};
use crate::eval::{AlwaysFalse, AlwaysTrue, Eval};
use crate::instance_type::InstanceType;
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct AnyOf {
    schemas: Vec<Arc<Schema>>,
}

impl AnyOf {
    pub(crate) fn new(schemas: Vec<Arc<Schema>>) -> Result<AnyOf, BuildError> {
        if schemas.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "anyOf" });
        }
        Ok(AnyOf { schemas })
    }
}

impl Keyword for AnyOf {
    fn name(&self) -> &str {
        "anyOf"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let branches = self.schemas.iter().map(|schema| schema.to_json()).collect();
        map.insert("anyOf".to_string(), Value::Array(branches));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if affirmative {
            if self.schemas.iter().any(|schema| schema.is_always_true()) {
                return Some(Box::new(AlwaysTrue));
            }
            let children: Vec<Eval> = self
                .schemas
                .iter()
                .filter(|schema| !schema.is_always_false())
                .map(|schema| schema.evaluator(ty, true))
                .collect();
            Some(match children.len() {
                0 => Box::new(AlwaysFalse::new("anyOf", "instance.problem.anyOf")),
                _ => Disjunction::boxed(children, "anyOf", "instance.problem.anyOf", true),
            })
        } else {
            if self.schemas.iter().any(|schema| schema.is_always_true()) {
                return Some(Box::new(AlwaysFalse::new(
                    "not",
                    "instance.problem.not.schema",
                )));
            }
            let mut children: Vec<Eval> = self
                .schemas
                .iter()
                .filter(|schema| !schema.is_always_false())
                .map(|schema| schema.evaluator(ty, false))
                .collect();
            Some(match children.len() {
                0 => Box::new(AlwaysTrue),
                1 => children.pop().expect("one child is present"),
                _ => Conjunction::boxed(children),
            })
        }
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match compile_list("anyOf", schema, context).and_then(AnyOf::new) {
        Ok(keyword) => ok(keyword),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("4", true; "matches both")]
    #[test_case("5", true; "matches one")]
    #[test_case("4.5", false)]
    fn verdicts(instance: &str, expected: bool) {
        let schema = json!({"anyOf": [{"type": "integer"}, {"multipleOf": 2.5}]});
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn failure_carries_per_branch_problems() {
        let schema = json!({"anyOf": [{"type": "integer"}, {"multipleOf": 2.5}]});
        let (_, problems) = check(&schema, "4.2");
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message_key(), "instance.problem.anyOf");
        assert_eq!(problems[0].branches().len(), 2);
        assert_eq!(problems[0].branches()[0][0].keyword(), "type");
        assert_eq!(problems[0].branches()[1][0].keyword(), "multipleOf");
    }
}
