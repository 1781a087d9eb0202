//! Validator for the `allOf` keyword.
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
pub(crate) struct AllOf {
    schemas: Vec<Arc<Schema>>,
}

impl AllOf {
    pub(crate) fn new(schemas: Vec<Arc<Schema>>) -> Result<AllOf, BuildError> {
        if schemas.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "allOf" });
        }
        Ok(AllOf { schemas })
    }
}

impl Keyword for AllOf {
    fn name(&self) -> &str {
        "allOf"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let branches = self.schemas.iter().map(|schema| schema.to_json()).collect();
        map.insert("allOf".to_string(), Value::Array(branches));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if affirmative {
            if self.schemas.iter().any(|schema| schema.is_always_false()) {
                return Some(Box::new(AlwaysFalse::new(
                    "allOf",
                    "instance.problem.unacceptable",
                )));
            }
            // Always-true branches cannot change the conjunction.
            let mut children: Vec<Eval> = self
                .schemas
                .iter()
                .filter(|schema| !schema.is_always_true())
                .map(|schema| schema.evaluator(ty, true))
                .collect();
            Some(match children.len() {
                0 => Box::new(AlwaysTrue),
                1 => children.pop().expect("one child is present"),
                _ => Conjunction::boxed(children),
            })
        } else {
            if self.schemas.iter().any(|schema| schema.is_always_false()) {
                return Some(Box::new(AlwaysTrue));
            }
            let mut children: Vec<Eval> = self
                .schemas
                .iter()
                .filter(|schema| !schema.is_always_true())
                .map(|schema| schema.evaluator(ty, false))
                .collect();
            Some(match children.len() {
                0 => Box::new(AlwaysFalse::new("not", "instance.problem.not.schema")),
                1 => children.pop().expect("one child is present"),
                _ => Disjunction::boxed(children, "not", "instance.problem.not.schema", false),
            })
        }
    }
}

pub(crate) fn compile_list(
    keyword: &'static str,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> Result<Vec<Arc<Schema>>, BuildError> {
    match schema {
        Value::Array(subschemas) => {
            if subschemas.is_empty() {
                return Err(BuildError::EmptyArray { keyword });
            }
            let mut compiled = Vec::with_capacity(subschemas.len());
            for (index, subschema) in subschemas.iter().enumerate() {
                let position = index.to_string();
                compiled.push(context.subschema(subschema, &[keyword, &position])?);
            }
            Ok(compiled)
        }
        _ => Err(BuildError::WrongType {
            keyword,
            expected: "a non-empty array of schemas",
        }),
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match compile_list("allOf", schema, context).and_then(AllOf::new) {
        Ok(keyword) => ok(keyword),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("4", 0)]
    #[test_case("5", 1; "fails the first branch")]
    #[test_case("3", 1; "fails the second branch")]
    #[test_case("5.5", 2; "problems are the union of branch problems")]
    fn problem_counts(instance: &str, expected: usize) {
        let schema = json!({"allOf": [{"type": "integer"}, {"multipleOf": 2}]});
        let (valid, problems) = check(&schema, instance);
        assert_eq!(problems.len(), expected);
        assert_eq!(valid, expected == 0);
    }

    #[test]
    fn rejects_empty_list() {
        assert!(crate::schemas::Schema::compile(&json!({"allOf": []})).is_err());
    }
}
