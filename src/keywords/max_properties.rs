//! Validator for the `maxProperties` keyword.
use super::helpers::non_negative_integer;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::shallow::Shallow;
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub(crate) struct MaxProperties {
    bound: u64,
}

impl MaxProperties {
    pub(crate) fn new(bound: u64) -> MaxProperties {
        MaxProperties { bound }
    }
}

impl Keyword for MaxProperties {
    fn name(&self) -> &str {
        "maxProperties"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("maxProperties".to_string(), Value::from(self.bound));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        Some(Shallow::wrap(Box::new(MaxPropertiesEvaluator {
            bound: self.bound,
            affirmative,
            count: 0,
        })))
    }
}

struct MaxPropertiesEvaluator {
    bound: u64,
    affirmative: bool,
    count: u64,
}

impl Evaluate for MaxPropertiesEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 {
            if let Event::Key(_) = ev.event {
                self.count += 1;
                if self.count > self.bound {
                    return if self.affirmative {
                        sink.dispatch(
                            Problem::new("maxProperties", "instance.problem.maxProperties", ev.location)
                                .param("bound", self.bound)
                                .param("actual", self.count),
                        );
                        Verdict::False
                    } else {
                        Verdict::True
                    };
                }
            }
        }
        if depth == 0 && ev.event == Event::EndObject {
            return if self.affirmative {
                Verdict::True
            } else {
                sink.dispatch(
                    Problem::new("maxProperties", "instance.problem.not.maxProperties", ev.location)
                        .param("bound", self.bound),
                );
                Verdict::False
            };
        }
        Verdict::Pending
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    match non_negative_integer(schema) {
        Some(bound) => ok(MaxProperties::new(bound)),
        None => fail(BuildError::WrongType {
            keyword: "maxProperties",
            expected: "a non-negative integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"a\": 1}", true)]
    #[test_case("{\"a\": {\"x\": 1, \"y\": 2, \"z\": 3}}", true; "nested keys do not count")]
    #[test_case("{\"a\": 1, \"b\": 2, \"c\": 3}", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"maxProperties": 2}), instance);
        assert_eq!(valid, expected);
    }
}
