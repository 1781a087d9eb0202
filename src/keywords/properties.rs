//! Validator for the `properties` keyword.
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
pub(crate) struct Properties {
    entries: Arc<Vec<(String, Arc<Schema>)>>,
}

impl Properties {
    pub(crate) fn new(entries: Vec<(String, Arc<Schema>)>) -> Properties {
        Properties {
            entries: Arc::new(entries),
        }
    }
}

impl Keyword for Properties {
    fn name(&self) -> &str {
        "properties"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let mut value = Map::new();
        for (name, schema) in self.entries.iter() {
            value.insert(name.clone(), schema.to_json());
        }
        map.insert("properties".to_string(), Value::Object(value));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        Some(Box::new(PropertiesEvaluator {
            entries: Arc::clone(&self.entries),
            affirmative,
            pending: None,
            active: None,
            any_failed: false,
        }))
    }
}

struct PropertiesEvaluator {
    entries: Arc<Vec<(String, Arc<Schema>)>>,
    affirmative: bool,
    pending: Option<Arc<Schema>>,
    active: Option<ElementChild>,
    any_failed: bool,
}

impl PropertiesEvaluator {
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

impl Evaluate for PropertiesEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndObject {
                return match (self.affirmative, self.any_failed) {
                    (true, false) => Verdict::True,
                    (true, true) => Verdict::False,
                    (false, true) => Verdict::True,
                    (false, false) => {
                        sink.dispatch(Problem::new(
                            "properties",
                            "instance.problem.not.properties",
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
                self.pending = self
                    .entries
                    .iter()
                    .find(|(entry, _)| entry == name)
                    .map(|(_, schema)| Arc::clone(schema));
            } else if ev.event.opens_value() {
                if let Some(schema) = self.pending.take() {
                    let (child, verdict) = ElementChild::spawn(&schema, true, ev);
                    if verdict.is_final() {
                        self.settle(verdict, child, sink);
                    } else {
                        self.active = Some(child);
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
            for (name, subschema) in map {
                match context.subschema(subschema, &["properties", name]) {
                    Ok(compiled) => entries.push((name.clone(), compiled)),
                    Err(error) => return fail(error),
                }
            }
            ok(Properties::new(entries))
        }
        _ => fail(BuildError::WrongType {
            keyword: "properties",
            expected: "an object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"a\": 1}", 0)]
    #[test_case("{\"a\": \"x\"}", 1)]
    #[test_case("{\"b\": \"anything\"}", 0; "undeclared properties are free")]
    #[test_case("{}", 0)]
    #[test_case("{\"a\": 1, \"b\": {\"a\": \"deep\"}}", 0; "matching is not recursive")]
    fn problem_counts(instance: &str, expected: usize) {
        let schema = json!({"properties": {"a": {"type": "integer"}}});
        let (valid, problems) = check(&schema, instance);
        assert_eq!(problems.len(), expected);
        assert_eq!(valid, expected == 0);
    }

    #[test]
    fn nested_subschemas() {
        let schema = json!({
            "properties": {
                "outer": {"properties": {"inner": {"type": "string"}}}
            }
        });
        let (valid, problems) = check(&schema, r#"{"outer": {"inner": 3}}"#);
        assert!(!valid);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].keyword(), "type");
    }
}
