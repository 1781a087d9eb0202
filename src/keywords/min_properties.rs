//! Validator for the `minProperties` keyword.
use super::helpers::non_negative_integer;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::shallow::Shallow;
use crate::eval::{AlwaysFalse, AlwaysTrue, Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub(crate) struct MinProperties {
    bound: u64,
}

impl MinProperties {
    pub(crate) fn new(bound: u64) -> MinProperties {
        MinProperties { bound }
    }
}

impl Keyword for MinProperties {
    fn name(&self) -> &str {
        "minProperties"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("minProperties".to_string(), Value::from(self.bound));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        if self.bound == 0 {
            return if affirmative {
                Some(Box::new(AlwaysTrue))
            } else {
                Some(Box::new(AlwaysFalse::new(
                    "minProperties",
                    "instance.problem.not.minProperties",
                )))
            };
        }
        Some(Shallow::wrap(Box::new(MinPropertiesEvaluator {
            bound: self.bound,
            affirmative,
            count: 0,
        })))
    }
}

struct MinPropertiesEvaluator {
    bound: u64,
    affirmative: bool,
    count: u64,
}

impl Evaluate for MinPropertiesEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 {
            if let Event::Key(_) = ev.event {
                self.count += 1;
                if self.count >= self.bound {
                    return if self.affirmative {
                        Verdict::True
                    } else {
                        sink.dispatch(
                            Problem::new(
                                "minProperties",
                                "instance.problem.not.minProperties",
                                ev.location,
                            )
                            .param("bound", self.bound),
                        );
                        Verdict::False
                    };
                }
            }
        }
        if depth == 0 && ev.event == Event::EndObject {
            return if self.affirmative {
                sink.dispatch(
                    Problem::new("minProperties", "instance.problem.minProperties", ev.location)
                        .param("bound", self.bound)
                        .param("actual", self.count),
                );
                Verdict::False
            } else {
                Verdict::True
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
        Some(bound) => ok(MinProperties::new(bound)),
        None => fail(BuildError::WrongType {
            keyword: "minProperties",
            expected: "a non-negative integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"a\": 1, \"b\": 2}", true)]
    #[test_case("{\"a\": 1}", false)]
    #[test_case("{}", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"minProperties": 2}), instance);
        assert_eq!(valid, expected);
    }
}
