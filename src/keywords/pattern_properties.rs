//! Validator for the `patternProperties` keyword.
use super::items::ElementChild;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct PatternProperties {
    entries: Arc<Vec<(String, Regex, Arc<Schema>)>>,
}

impl PatternProperties {
    pub(crate) fn new(entries: Vec<(String, Regex, Arc<Schema>)>) -> PatternProperties {
        PatternProperties {
            entries: Arc::new(entries),
        }
    }
}

impl Keyword for PatternProperties {
    fn name(&self) -> &str {
        "patternProperties"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let mut value = Map::new();
        for (pattern, _, schema) in self.entries.iter() {
            value.insert(pattern.clone(), schema.to_json());
        }
        map.insert("patternProperties".to_string(), Value::Object(value));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        Some(Box::new(PatternPropertiesEvaluator {
            entries: Arc::clone(&self.entries),
            affirmative,
            pending: Vec::new(),
            active: Vec::new(),
            any_failed: false,
        }))
    }
}

struct PatternPropertiesEvaluator {
    entries: Arc<Vec<(String, Regex, Arc<Schema>)>>,
    affirmative: bool,
    pending: Vec<Arc<Schema>>,
    /// A single value can match several patterns; all run in lockstep.
    active: Vec<ElementChild>,
    any_failed: bool,
}

impl PatternPropertiesEvaluator {
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

impl Evaluate for PatternPropertiesEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndObject {
                return match (self.affirmative, self.any_failed) {
                    (true, false) => Verdict::True,
                    (true, true) => Verdict::False,
                    (false, true) => Verdict::True,
                    (false, false) => {
                        sink.dispatch(Problem::new(
                            "patternProperties",
                            "instance.problem.not.patternProperties",
                            ev.location,
                        ));
                        Verdict::False
                    }
                };
            }
            return Verdict::Pending;
        }
        if !self.active.is_empty() {
            let mut still_running = Vec::with_capacity(self.active.len());
            for mut child in self.active.drain(..) {
                let verdict = child.step(ev, depth - 1);
                if verdict.is_final() {
                    if verdict == Verdict::False {
                        self.any_failed = true;
                        if self.affirmative {
                            for problem in child.problems.drain(..) {
                                sink.dispatch(problem);
                            }
                        }
                    }
                } else {
                    still_running.push(child);
                }
            }
            self.active = still_running;
            return Verdict::Pending;
        }
        if depth == 1 {
            if let Event::Key(name) = &ev.event {
                // Unanchored find, like `pattern`.
                self.pending = self
                    .entries
                    .iter()
                    .filter(|(_, regex, _)| regex.is_match(name))
                    .map(|(_, _, schema)| Arc::clone(schema))
                    .collect();
            } else if ev.event.opens_value() {
                for schema in std::mem::take(&mut self.pending) {
                    let (child, verdict) = ElementChild::spawn(&schema, true, ev);
                    if verdict.is_final() {
                        self.settle(verdict, child, sink);
                    } else {
                        self.active.push(child);
                    }
                }
            }
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
    match schema {
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (pattern, subschema) in map {
                let regex = match Regex::new(pattern) {
                    Ok(regex) => regex,
                    Err(_) => {
                        return fail(BuildError::InvalidRegex {
                            pattern: pattern.clone(),
                        })
                    }
                };
                match context.subschema(subschema, &["patternProperties", pattern]) {
                    Ok(compiled) => entries.push((pattern.clone(), regex, compiled)),
                    Err(error) => return fail(error),
                }
            }
            ok(PatternProperties::new(entries))
        }
        _ => fail(BuildError::WrongType {
            keyword: "patternProperties",
            expected: "an object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"x_count\": 3}", true)]
    #[test_case("{\"x_count\": \"3\"}", false)]
    #[test_case("{\"other\": \"free\"}", true)]
    fn verdicts(instance: &str, expected: bool) {
        let schema = json!({"patternProperties": {"_count$": {"type": "integer"}}});
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn all_matching_patterns_apply() {
        let schema = json!({"patternProperties": {
            "^a": {"type": "integer"},
            "b$": {"minimum": 10}
        }});
        let (valid, problems) = check(&schema, "{\"ab\": 5}");
        assert!(!valid);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].keyword(), "minimum");
    }

    #[test]
    fn rejects_invalid_pattern() {
        assert!(Schema::compile(&json!({"patternProperties": {"(": {}}})).is_err());
    }
}
