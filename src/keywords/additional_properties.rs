//! Validator for the `additionalProperties` keyword.
//!
//! A property is additional when its name matches neither a `properties`
//! literal nor a `patternProperties` regex of the same schema; only then
//! does this keyword's subschema apply.
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
pub(crate) struct AdditionalProperties {
    schema: Arc<Schema>,
    literals: Arc<Vec<String>>,
    patterns: Arc<Vec<Regex>>,
}

impl AdditionalProperties {
    pub(crate) fn new(
        schema: Arc<Schema>,
        literals: Vec<String>,
        patterns: Vec<Regex>,
    ) -> AdditionalProperties {
        AdditionalProperties {
            schema,
            literals: Arc::new(literals),
            patterns: Arc::new(patterns),
        }
    }
}

impl Keyword for AdditionalProperties {
    fn name(&self) -> &str {
        "additionalProperties"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("additionalProperties".to_string(), self.schema.to_json());
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        Some(Box::new(AdditionalPropertiesEvaluator {
            schema: Arc::clone(&self.schema),
            literals: Arc::clone(&self.literals),
            patterns: Arc::clone(&self.patterns),
            forbidden: self.schema.is_always_false(),
            affirmative,
            pending: false,
            active: None,
            any_failed: false,
        }))
    }
}

struct AdditionalPropertiesEvaluator {
    schema: Arc<Schema>,
    literals: Arc<Vec<String>>,
    patterns: Arc<Vec<Regex>>,
    forbidden: bool,
    affirmative: bool,
    pending: bool,
    active: Option<ElementChild>,
    any_failed: bool,
}

impl AdditionalPropertiesEvaluator {
    fn is_additional(&self, name: &str) -> bool {
        !self.literals.iter().any(|literal| literal == name)
            && !self.patterns.iter().any(|regex| regex.is_match(name))
    }

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

impl Evaluate for AdditionalPropertiesEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndObject {
                return match (self.affirmative, self.any_failed) {
                    (true, false) => Verdict::True,
                    (true, true) => Verdict::False,
                    (false, true) => Verdict::True,
                    (false, false) => {
                        sink.dispatch(Problem::new(
                            "additionalProperties",
                            "instance.problem.not.additionalProperties",
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
        if depth == 1 {
            if let Event::Key(name) = &ev.event {
                self.pending = self.is_additional(name);
                if self.pending && self.forbidden {
                    // The unexpected name itself is the problem; report it
                    // at the key's location.
                    self.pending = false;
                    self.any_failed = true;
                    if self.affirmative {
                        sink.dispatch(
                            Problem::new(
                                "additionalProperties",
                                "instance.problem.additionalProperties",
                                ev.location,
                            )
                            .param("name", name.clone()),
                        );
                    }
                }
            } else if ev.event.opens_value() && self.pending {
                self.pending = false;
                let (child, verdict) = ElementChild::spawn(&self.schema, true, ev);
                if verdict.is_final() {
                    self.settle(verdict, child, sink);
                } else {
                    self.active = Some(child);
                }
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
    let literals = match parent.get("properties") {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    let mut patterns = Vec::new();
    if let Some(Value::Object(map)) = parent.get("patternProperties") {
        for pattern in map.keys() {
            match Regex::new(pattern) {
                Ok(regex) => patterns.push(regex),
                Err(_) => {
                    return fail(BuildError::InvalidRegex {
                        pattern: pattern.clone(),
                    })
                }
            }
        }
    }
    match context.subschema(schema, &["additionalProperties"]) {
        Ok(compiled) => ok(AdditionalProperties::new(compiled, literals, patterns)),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"a\": 1}", true)]
    #[test_case("{\"a\": 1, \"b\": 2}", false)]
    #[test_case("{}", true)]
    fn forbidding(instance: &str, expected: bool) {
        let schema = json!({
            "properties": {"a": {"type": "integer"}},
            "additionalProperties": false
        });
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        if !expected {
            assert_eq!(problems.len(), 1);
            assert_eq!(problems[0].keyword(), "additionalProperties");
            assert_eq!(problems[0].parameters()[0], ("name", json!("b")));
        }
    }

    #[test_case("{\"a\": 1, \"extra\": \"x\"}", true)]
    #[test_case("{\"a\": 1, \"extra\": 2}", false)]
    fn typed_extras(instance: &str, expected: bool) {
        let schema = json!({
            "properties": {"a": {}},
            "additionalProperties": {"type": "string"}
        });
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn pattern_matches_are_not_additional() {
        let schema = json!({
            "patternProperties": {"^x_": {}},
            "additionalProperties": false
        });
        let (valid, _) = check(&schema, "{\"x_anything\": 1}");
        assert!(valid);
        let (valid, _) = check(&schema, "{\"y_anything\": 1}");
        assert!(!valid);
    }

    #[test]
    fn alone_it_applies_to_every_property() {
        let schema = json!({"additionalProperties": {"type": "integer"}});
        let (valid, _) = check(&schema, "{\"a\": 1, \"b\": 2}");
        assert!(valid);
        let (valid, _) = check(&schema, "{\"a\": \"x\"}");
        assert!(!valid);
    }
}
