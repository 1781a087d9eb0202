//! Validator for the `additionalItems` keyword.
//!
//! Meaningful only next to a tuple-form `items`; elements beyond the tuple
//! are matched against this schema. Alone it has nothing to apply to and the
//! reader drops it.
use super::items::ElementChild;
use super::{fail, ok, CompileResult, Keyword};
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct AdditionalItems {
    schema: Arc<Schema>,
    tuple_len: usize,
}

impl AdditionalItems {
    pub(crate) fn new(schema: Arc<Schema>, tuple_len: usize) -> AdditionalItems {
        AdditionalItems { schema, tuple_len }
    }
}

impl Keyword for AdditionalItems {
    fn name(&self) -> &str {
        "additionalItems"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Array
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("additionalItems".to_string(), self.schema.to_json());
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Array {
            return None;
        }
        Some(Box::new(AdditionalItemsEvaluator {
            schema: Arc::clone(&self.schema),
            tuple_len: self.tuple_len,
            affirmative,
            forbidden: self.schema.is_always_false(),
            index: 0,
            active: None,
            any_failed: false,
        }))
    }
}

struct AdditionalItemsEvaluator {
    schema: Arc<Schema>,
    tuple_len: usize,
    affirmative: bool,
    forbidden: bool,
    index: usize,
    active: Option<ElementChild>,
    any_failed: bool,
}

impl Evaluate for AdditionalItemsEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndArray {
                return match (self.affirmative, self.any_failed) {
                    (true, false) => Verdict::True,
                    (true, true) => Verdict::False,
                    (false, true) => Verdict::True,
                    (false, false) => {
                        sink.dispatch(Problem::new(
                            "additionalItems",
                            "instance.problem.not.items",
                            ev.location,
                        ));
                        Verdict::False
                    }
                };
            }
            return Verdict::Pending;
        }
        if let Some(mut child) = self.active.take() {
            let verdict = child.step(ev, depth - 1);
            if verdict.is_final() {
                self.settle(verdict, child, sink);
            } else {
                self.active = Some(child);
            }
            return Verdict::Pending;
        }
        if depth == 1 && ev.event.opens_value() {
            let index = self.index;
            self.index += 1;
            if index < self.tuple_len {
                return Verdict::Pending;
            }
            if self.forbidden {
                // `additionalItems: false` rejects the first extra element.
                self.any_failed = true;
                if self.affirmative {
                    sink.dispatch(
                        Problem::new("additionalItems", "instance.problem.additionalItems", ev.location)
                            .param("bound", self.tuple_len as u64),
                    );
                    return Verdict::False;
                }
                return Verdict::Pending;
            }
            let (child, verdict) = ElementChild::spawn(&self.schema, true, ev);
            if verdict.is_final() {
                self.settle(verdict, child, sink);
            } else {
                self.active = Some(child);
            }
        }
        Verdict::Pending
    }
}

impl AdditionalItemsEvaluator {
    fn settle(&mut self, verdict: Verdict, child: ElementChild, sink: &mut dyn ProblemSink) {
        if verdict == Verdict::False {
            self.any_failed = true;
            if self.affirmative {
                for problem in child.problems {
                    sink.dispatch(problem);
                }
            }
        }
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    let tuple_len = match parent.get("items") {
        Some(Value::Array(subschemas)) => subschemas.len(),
        // Without a tuple `items` there are no additional items.
        _ => return None,
    };
    match context.subschema(schema, &["additionalItems"]) {
        Ok(compiled) => ok(AdditionalItems::new(compiled, tuple_len)),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("[1]", true)]
    #[test_case("[1, \"x\"]", true)]
    #[test_case("[1, \"x\", 2]", false)]
    fn forbidding_extras(instance: &str, expected: bool) {
        let schema = json!({
            "items": [{"type": "integer"}, {"type": "string"}],
            "additionalItems": false
        });
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        if !expected {
            assert_eq!(problems[0].keyword(), "additionalItems");
        }
    }

    #[test_case("[1, \"x\", 2, 3]", true)]
    #[test_case("[1, \"x\", 2.5]", false)]
    fn typed_extras(instance: &str, expected: bool) {
        let schema = json!({
            "items": [{"type": "integer"}, {"type": "string"}],
            "additionalItems": {"type": "integer"}
        });
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn ignored_without_tuple_items(){
        let schema = json!({"additionalItems": false});
        let (valid, _) = check(&schema, "[1, 2]");
        assert!(valid);
    }
}
