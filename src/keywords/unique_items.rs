//! Validator for the `uniqueItems` keyword.
//!
//! Every element is rebuilt into a value and compared structurally against
//! the elements seen before it. The per-array buffer is the documented
//! allocation cost of this assertion.
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::value::{equal, ValueBuilder};
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

#[derive(Debug)]
pub(crate) struct UniqueItems;

impl UniqueItems {
    pub(crate) fn new() -> UniqueItems {
        UniqueItems
    }
}

impl Keyword for UniqueItems {
    fn name(&self) -> &str {
        "uniqueItems"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Array
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("uniqueItems".to_string(), Value::Bool(true));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Array {
            return None;
        }
        Some(Box::new(UniqueItemsEvaluator {
            affirmative,
            seen: Vec::new(),
            current: None,
        }))
    }
}

struct UniqueItemsEvaluator {
    affirmative: bool,
    seen: Vec<Value>,
    current: Option<ValueBuilder>,
}

impl Evaluate for UniqueItemsEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndArray {
                return if self.affirmative {
                    Verdict::True
                } else {
                    sink.dispatch(Problem::new(
                        "uniqueItems",
                        "instance.problem.not.uniqueItems",
                        ev.location,
                    ));
                    Verdict::False
                };
            }
            return Verdict::Pending;
        }
        if self.current.is_none() {
            if !(depth == 1 && ev.event.opens_value()) {
                return Verdict::Pending;
            }
            self.current = Some(ValueBuilder::new());
        }
        let builder = self.current.as_mut().expect("a builder is active");
        if !builder.feed(&ev.event) {
            return Verdict::Pending;
        }
        let value = builder.take();
        self.current = None;
        if let Some(value) = value {
            if let Some(first) = self.seen.iter().position(|seen| equal(seen, &value)) {
                return if self.affirmative {
                    sink.dispatch(
                        Problem::new("uniqueItems", "instance.problem.uniqueItems", ev.location)
                            .param("index", self.seen.len() as u64)
                            .param("first", first as u64),
                    );
                    Verdict::False
                } else {
                    Verdict::True
                };
            }
            self.seen.push(value);
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
    match schema {
        Value::Bool(true) => ok(UniqueItems::new()),
        // `uniqueItems: false` asserts nothing.
        Value::Bool(false) => None,
        _ => fail(BuildError::WrongType {
            keyword: "uniqueItems",
            expected: "a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("[1, 2, 3]", true)]
    #[test_case("[]", true)]
    #[test_case("[1, 2, 1]", false)]
    #[test_case("[1, 1.0]", false; "numeric canonicalisation")]
    #[test_case("[{\"a\": 1}, {\"a\": 1}]", false; "structural equality")]
    #[test_case("[{\"a\": 1}, {\"a\": 2}]", true)]
    #[test_case("[[1], [1.0]]", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, problems) = check(&json!({"uniqueItems": true}), instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn duplicate_reports_both_positions() {
        let (_, problems) = check(&json!({"uniqueItems": true}), "[5, 6, 5]");
        let params = problems[0].parameters();
        assert_eq!(params[0], ("index", json!(2)));
        assert_eq!(params[1], ("first", json!(0)));
    }
}
