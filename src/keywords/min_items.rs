//! Validator for the `minItems` keyword.
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
pub(crate) struct MinItems {
    bound: u64,
}

impl MinItems {
    pub(crate) fn new(bound: u64) -> MinItems {
        MinItems { bound }
    }
}

impl Keyword for MinItems {
    fn name(&self) -> &str {
        "minItems"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Array
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("minItems".to_string(), Value::from(self.bound));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Array {
            return None;
        }
        if self.bound == 0 {
            return if affirmative {
                Some(Box::new(crate::eval::AlwaysTrue))
            } else {
                Some(Box::new(crate::eval::AlwaysFalse::new(
                    "minItems",
                    "instance.problem.not.minItems",
                )))
            };
        }
        Some(Shallow::wrap(Box::new(MinItemsEvaluator {
            bound: self.bound,
            affirmative,
            count: 0,
        })))
    }
}

struct MinItemsEvaluator {
    bound: u64,
    affirmative: bool,
    count: u64,
}

impl Evaluate for MinItemsEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 && ev.event.opens_value() {
            self.count += 1;
            if self.count >= self.bound {
                return if self.affirmative {
                    Verdict::True
                } else {
                    sink.dispatch(
                        Problem::new("minItems", "instance.problem.not.minItems", ev.location)
                            .param("bound", self.bound),
                    );
                    Verdict::False
                };
            }
        }
        if depth == 0 && ev.event == Event::EndArray {
            return if self.affirmative {
                sink.dispatch(
                    Problem::new("minItems", "instance.problem.minItems", ev.location)
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
        Some(bound) => ok(MinItems::new(bound)),
        None => fail(BuildError::WrongType {
            keyword: "minItems",
            expected: "a non-negative integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("[1, 2]", true)]
    #[test_case("[1]", false)]
    #[test_case("[]", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"minItems": 2}), instance);
        assert_eq!(valid, expected);
    }
}
