//! Validator for the `not` keyword.
use super::{fail, ok, CompileResult, Keyword};
use crate::eval::Eval;
use crate::instance_type::InstanceType;
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct Not {
    schema: Arc<Schema>,
}

impl Not {
    pub(crate) fn new(schema: Arc<Schema>) -> Not {
        Not { schema }
    }
}

impl Keyword for Not {
    fn name(&self) -> &str {
        "not"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("not".to_string(), self.schema.to_json());
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        // `not` just flips the polarity requested from the subschema;
        // double negation cancels out.
        Some(self.schema.evaluator(ty, !affirmative))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match context.subschema(schema, &["not"]) {
        Ok(compiled) => ok(Not::new(compiled)),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"not": {"type": "integer"}}), "\"x\"", true)]
    #[test_case(json!({"not": {"type": "integer"}}), "5", false)]
    #[test_case(json!({"not": {"not": {"type": "integer"}}}), "5", true; "double negation")]
    #[test_case(json!({"not": {}}), "5", false; "nothing passes a negated empty schema")]
    #[test_case(json!({"not": {"maximum": 4}}), "5", true; "bound flips")]
    #[test_case(json!({"not": {"required": ["a"]}}), "{\"b\": 1}", true)]
    #[test_case(json!({"not": {"required": ["a"]}}), "{\"a\": 1}", false)]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn negation_flip_invariant() {
        // Zero problems under `not S` exactly when `S` yields at least one.
        let cases = [
            (json!({"type": "integer"}), "5"),
            (json!({"type": "integer"}), "\"x\""),
            (json!({"minimum": 3}), "2"),
            (json!({"dependencies": {"a": ["b"]}}), "{}"),
            (json!({"dependencies": {"a": ["b"]}}), "{\"a\": 1}"),
        ];
        for (schema, instance) in &cases {
            let (_, direct) = check(schema, instance);
            let (_, negated) = check(&json!({ "not": schema }), instance);
            assert_eq!(
                direct.is_empty(),
                !negated.is_empty(),
                "invariant failed for {} against {}",
                schema,
                instance
            );
        }
    }
}
