//! Validator for the `propertyNames` keyword.
use super::{fail, ok, CompileResult, Keyword};
use crate::eval::shallow::Shallow;
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct PropertyNames {
    schema: Arc<Schema>,
}

impl PropertyNames {
    pub(crate) fn new(schema: Arc<Schema>) -> PropertyNames {
        PropertyNames { schema }
    }
}

impl Keyword for PropertyNames {
    fn name(&self) -> &str {
        "propertyNames"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("propertyNames".to_string(), self.schema.to_json());
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        Some(Shallow::wrap(Box::new(PropertyNamesEvaluator {
            schema: Arc::clone(&self.schema),
            affirmative,
            any_failed: false,
        })))
    }
}

struct PropertyNamesEvaluator {
    schema: Arc<Schema>,
    affirmative: bool,
    any_failed: bool,
}

impl Evaluate for PropertyNamesEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 {
            if let Event::Key(name) = &ev.event {
                // Each name is itself a string instance; one synthetic event
                // drives the subschema to a verdict on the spot.
                let synthetic = ParsedEvent::new(Event::String(name.clone()), ev.location);
                let mut eval = self.schema.evaluator(InstanceType::String, true);
                let mut problems = Vec::new();
                let verdict = eval.evaluate(&synthetic, 0, &mut problems);
                if verdict == Verdict::False {
                    self.any_failed = true;
                    if self.affirmative {
                        for problem in problems {
                            sink.dispatch(problem);
                        }
                    }
                }
            }
        }
        if depth == 0 && ev.event == Event::EndObject {
            return match (self.affirmative, self.any_failed) {
                (true, false) => Verdict::True,
                (true, true) => Verdict::False,
                (false, true) => Verdict::True,
                (false, false) => {
                    sink.dispatch(Problem::new(
                        "propertyNames",
                        "instance.problem.not.propertyNames",
                        ev.location,
                    ));
                    Verdict::False
                }
            };
        }
        Verdict::Pending
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match context.subschema(schema, &["propertyNames"]) {
        Ok(compiled) => ok(PropertyNames::new(compiled)),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"ab\": 1}", true)]
    #[test_case("{\"abcd\": 1}", false)]
    #[test_case("{}", true)]
    fn verdicts(instance: &str, expected: bool) {
        let schema = json!({"propertyNames": {"maxLength": 3}});
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }
}
