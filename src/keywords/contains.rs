//! Validator for the `contains` keyword with its `minContains` and
//! `maxContains` refinements.
use super::helpers::non_negative_integer;
use super::items::ElementChild;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct Contains {
    schema: Arc<Schema>,
    min: u64,
    max: Option<u64>,
}

impl Contains {
    pub(crate) fn new(schema: Arc<Schema>, min: u64, max: Option<u64>) -> Result<Contains, BuildError> {
        if let Some(max) = max {
            if max < min {
                return Err(BuildError::OutOfRange {
                    keyword: "maxContains",
                    constraint: "greater than or equal to minContains",
                });
            }
        }
        Ok(Contains { schema, min, max })
    }
}

impl Keyword for Contains {
    fn name(&self) -> &str {
        "contains"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Array
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("contains".to_string(), self.schema.to_json());
        if self.min != 1 {
            map.insert("minContains".to_string(), Value::from(self.min));
        }
        if let Some(max) = self.max {
            map.insert("maxContains".to_string(), Value::from(max));
        }
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Array {
            return None;
        }
        Some(Box::new(ContainsEvaluator {
            schema: Arc::clone(&self.schema),
            min: self.min,
            max: self.max,
            affirmative,
            matched: 0,
            active: None,
        }))
    }
}

struct ContainsEvaluator {
    schema: Arc<Schema>,
    min: u64,
    max: Option<u64>,
    affirmative: bool,
    matched: u64,
    active: Option<ElementChild>,
}

impl ContainsEvaluator {
    fn over_max(&self) -> bool {
        self.max.map_or(false, |max| self.matched > max)
    }
}

impl Evaluate for ContainsEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndArray {
                // `minContains: 0` makes an empty match acceptable.
                let satisfied = self.matched >= self.min && !self.over_max();
                return match (satisfied, self.affirmative) {
                    (true, true) | (false, false) => Verdict::True,
                    (false, true) => {
                        sink.dispatch(
                            Problem::new("contains", "instance.problem.contains", ev.location)
                                .param("bound", self.min),
                        );
                        Verdict::False
                    }
                    (true, false) => {
                        sink.dispatch(Problem::new(
                            "contains",
                            "instance.problem.not.contains",
                            ev.location,
                        ));
                        Verdict::False
                    }
                };
            }
            return Verdict::Pending;
        }
        let verdict = if let Some(mut child) = self.active.take() {
            let verdict = child.step(ev, depth - 1);
            if !verdict.is_final() {
                self.active = Some(child);
            }
            verdict
        } else if depth == 1 && ev.event.opens_value() {
            let (child, verdict) = ElementChild::spawn(&self.schema, true, ev);
            if !verdict.is_final() {
                self.active = Some(child);
            }
            verdict
        } else {
            return Verdict::Pending;
        };
        if matches!(verdict, Verdict::True | Verdict::Ignored) {
            self.matched += 1;
            if self.over_max() {
                return if self.affirmative {
                    sink.dispatch(
                        Problem::new("contains", "instance.problem.maxContains", ev.location)
                            .param("bound", self.max.unwrap_or(0))
                            .param("actual", self.matched),
                    );
                    Verdict::False
                } else {
                    Verdict::True
                };
            }
        }
        Verdict::Pending
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    let min = match parent.get("minContains") {
        Some(value) => match non_negative_integer(value) {
            Some(bound) => bound,
            None => {
                return fail(BuildError::WrongType {
                    keyword: "minContains",
                    expected: "a non-negative integer",
                })
            }
        },
        None => 1,
    };
    let max = match parent.get("maxContains") {
        Some(value) => match non_negative_integer(value) {
            Some(bound) => Some(bound),
            None => {
                return fail(BuildError::WrongType {
                    keyword: "maxContains",
                    expected: "a non-negative integer",
                })
            }
        },
        None => None,
    };
    match context.subschema(schema, &["contains"]) {
        Ok(compiled) => match Contains::new(compiled, min, max) {
            Ok(keyword) => ok(keyword),
            Err(error) => fail(error),
        },
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"contains": {"minimum": 5}}), "[1, 7, 2]", true)]
    #[test_case(json!({"contains": {"minimum": 5}}), "[1, 2]", false)]
    #[test_case(json!({"contains": {"minimum": 5}}), "[]", false)]
    #[test_case(json!({"contains": {"minimum": 5}, "minContains": 0}), "[]", true; "zero minimum accepts the empty match")]
    #[test_case(json!({"contains": {"minimum": 5}, "minContains": 2}), "[7, 1, 9]", true)]
    #[test_case(json!({"contains": {"minimum": 5}, "minContains": 2}), "[7, 1]", false)]
    #[test_case(json!({"contains": {"minimum": 5}, "maxContains": 1}), "[7, 9]", false)]
    #[test_case(json!({"contains": {"minimum": 5}, "maxContains": 2}), "[7, 9]", true)]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }
}
