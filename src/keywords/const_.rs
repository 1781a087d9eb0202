//! Validator for the `const` keyword.
use super::{ok, CompileResult, Keyword};
use crate::eval::value::{equal, ValueBuilder};
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::ParsedEvent;
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

/// Rebuilds the instance value from events and compares it structurally
/// against a set of candidates. Scalars complete on their only event, so the
/// buffering cost is paid for arrays and objects alone. Shared between
/// `const` (one candidate) and `enum` (many).
pub(crate) struct DeepCompare {
    targets: Vec<Value>,
    affirmative: bool,
    keyword: &'static str,
    message_key: &'static str,
    negated_key: &'static str,
    expected: Value,
    builder: ValueBuilder,
}

impl DeepCompare {
    pub(crate) fn boxed(
        targets: Vec<Value>,
        affirmative: bool,
        keyword: &'static str,
        message_key: &'static str,
        negated_key: &'static str,
        expected: Value,
    ) -> Eval {
        Box::new(DeepCompare {
            targets,
            affirmative,
            keyword,
            message_key,
            negated_key,
            expected,
            builder: ValueBuilder::new(),
        })
    }
}

impl Evaluate for DeepCompare {
    fn evaluate(&mut self, ev: &ParsedEvent, _: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if !self.builder.feed(&ev.event) {
            return Verdict::Pending;
        }
        let value = match self.builder.take() {
            Some(value) => value,
            None => return Verdict::Pending,
        };
        let matched = self.targets.iter().any(|target| equal(target, &value));
        if matched == self.affirmative {
            Verdict::True
        } else {
            let key = if self.affirmative {
                self.message_key
            } else {
                self.negated_key
            };
            sink.dispatch(
                Problem::new(self.keyword, key, ev.location)
                    .param("expected", self.expected.clone()),
            );
            Verdict::False
        }
    }
}

#[derive(Debug)]
pub(crate) struct Const {
    value: Value,
}

impl Const {
    pub(crate) fn new(value: Value) -> Const {
        Const { value }
    }
}

impl Keyword for Const {
    fn name(&self) -> &str {
        "const"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("const".to_string(), self.value.clone());
    }

    fn evaluator(&self, _: InstanceType, affirmative: bool) -> Option<Eval> {
        Some(DeepCompare::boxed(
            vec![self.value.clone()],
            affirmative,
            "const",
            "instance.problem.const",
            "instance.problem.not.const",
            self.value.clone(),
        ))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    ok(Const::new(schema.clone()))
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"const": 1}), "1", true)]
    #[test_case(json!({"const": 1}), "1.0", true; "numeric canonicalisation")]
    #[test_case(json!({"const": 1}), "1e0", true; "exponent form")]
    #[test_case(json!({"const": 1}), "2", false)]
    #[test_case(json!({"const": {"a": [1, 2]}}), r#"{"a": [1.0, 2]}"#, true)]
    #[test_case(json!({"const": {"a": [1, 2]}}), r#"{"a": [1, 3]}"#, false)]
    #[test_case(json!({"const": "x"}), "\"x\"", true)]
    #[test_case(json!({"const": "x"}), "1", false; "type mismatch")]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }
}
