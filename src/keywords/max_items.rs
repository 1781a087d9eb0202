//! Validator for the `maxItems` keyword.
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
pub(crate) struct MaxItems {
    bound: u64,
}

impl MaxItems {
    pub(crate) fn new(bound: u64) -> MaxItems {
        MaxItems { bound }
    }
}

impl Keyword for MaxItems {
    fn name(&self) -> &str {
        "maxItems"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Array
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("maxItems".to_string(), Value::from(self.bound));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Array {
            return None;
        }
        Some(Shallow::wrap(Box::new(MaxItemsEvaluator {
            bound: self.bound,
            affirmative,
            count: 0,
        })))
    }
}

struct MaxItemsEvaluator {
    bound: u64,
    affirmative: bool,
    count: u64,
}

impl Evaluate for MaxItemsEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 && ev.event.opens_value() {
            self.count += 1;
            if self.count > self.bound {
                // Sufficient evidence; no need to wait for the closing bracket.
                return if self.affirmative {
                    sink.dispatch(
                        Problem::new("maxItems", "instance.problem.maxItems", ev.location)
                            .param("bound", self.bound)
                            .param("actual", self.count),
                    );
                    Verdict::False
                } else {
                    Verdict::True
                };
            }
        }
        if depth == 0 && ev.event == Event::EndArray {
            return if self.affirmative {
                Verdict::True
            } else {
                sink.dispatch(
                    Problem::new("maxItems", "instance.problem.not.maxItems", ev.location)
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
        Some(bound) => ok(MaxItems::new(bound)),
        None => fail(BuildError::WrongType {
            keyword: "maxItems",
            expected: "a non-negative integer",
        }),
    }
}
