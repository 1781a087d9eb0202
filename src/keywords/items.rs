//! Validator for the `items` keyword, in both single-schema and tuple form.
use super::{fail, CompileResult, Keyword};
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
enum Form {
    Single(Arc<Schema>),
    Tuple(Vec<Arc<Schema>>),
}

#[derive(Debug)]
pub(crate) struct Items {
    form: Form,
}

impl Items {
    pub(crate) fn single(schema: Arc<Schema>) -> Items {
        Items {
            form: Form::Single(schema),
        }
    }

    pub(crate) fn tuple(schemas: Vec<Arc<Schema>>) -> Result<Items, BuildError> {
        if schemas.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "items" });
        }
        Ok(Items {
            form: Form::Tuple(schemas),
        })
    }

    fn schema_for(&self, index: usize) -> Option<&Arc<Schema>> {
        match &self.form {
            Form::Single(schema) => Some(schema),
            Form::Tuple(schemas) => schemas.get(index),
        }
    }
}

impl Keyword for Items {
    fn name(&self) -> &str {
        "items"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Array
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let value = match &self.form {
            Form::Single(schema) => schema.to_json(),
            Form::Tuple(schemas) => {
                Value::Array(schemas.iter().map(|schema| schema.to_json()).collect())
            }
        };
        map.insert("items".to_string(), value);
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Array {
            return None;
        }
        let schemas = match &self.form {
            Form::Single(schema) => Elements::Single(Arc::clone(schema)),
            Form::Tuple(schemas) => Elements::Tuple(schemas.clone()),
        };
        Some(Box::new(ItemsEvaluator {
            schemas,
            affirmative,
            index: 0,
            active: None,
            any_failed: false,
        }))
    }
}

enum Elements {
    Single(Arc<Schema>),
    Tuple(Vec<Arc<Schema>>),
}

impl Elements {
    fn get(&self, index: usize) -> Option<&Arc<Schema>> {
        match self {
            Elements::Single(schema) => Some(schema),
            Elements::Tuple(schemas) => schemas.get(index),
        }
    }
}

/// Per-element child state shared by the array applicators: the child's
/// evaluator plus its buffered problems.
pub(crate) struct ElementChild {
    pub(crate) eval: Eval,
    pub(crate) problems: Vec<Problem>,
}

impl ElementChild {
    pub(crate) fn spawn(schema: &Arc<Schema>, affirmative: bool, ev: &ParsedEvent) -> (ElementChild, Verdict) {
        let ty = InstanceType::of(&ev.event).unwrap_or(InstanceType::Null);
        let mut child = ElementChild {
            eval: schema.evaluator(ty, affirmative),
            problems: Vec::new(),
        };
        let verdict = child.eval.evaluate(ev, 0, &mut child.problems);
        (child, verdict)
    }

    pub(crate) fn step(&mut self, ev: &ParsedEvent, depth: usize) -> Verdict {
        self.eval.evaluate(ev, depth, &mut self.problems)
    }
}

struct ItemsEvaluator {
    schemas: Elements,
    affirmative: bool,
    index: usize,
    active: Option<ElementChild>,
    any_failed: bool,
}

impl ItemsEvaluator {
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

impl Evaluate for ItemsEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 0 {
            if ev.event == Event::EndArray {
                return match (self.affirmative, self.any_failed) {
                    (true, false) => Verdict::True,
                    (true, true) => Verdict::False,
                    (false, true) => Verdict::True,
                    (false, false) => {
                        sink.dispatch(Problem::new("items", "instance.problem.not.items", ev.location));
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
        if depth == 1 && ev.event.opens_value() {
            let index = self.index;
            self.index += 1;
            if let Some(schema) = self.schemas.get(index) {
                let (child, verdict) = ElementChild::spawn(schema, true, ev);
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
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match schema {
        Value::Array(subschemas) => {
            let mut compiled = Vec::with_capacity(subschemas.len());
            for (index, subschema) in subschemas.iter().enumerate() {
                let position = index.to_string();
                match context.subschema(subschema, &["items", &position]) {
                    Ok(schema) => compiled.push(schema),
                    Err(error) => return fail(error),
                }
            }
            match Items::tuple(compiled) {
                Ok(keyword) => super::ok(keyword),
                Err(error) => fail(error),
            }
        }
        _ => match context.subschema(schema, &["items"]) {
            Ok(compiled) => super::ok(Items::single(compiled)),
            Err(error) => fail(error),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"items": {"type": "integer"}}), "[1, 2, 3]", 0)]
    #[test_case(json!({"items": {"type": "integer"}}), "[1, \"x\", 2.5]", 2)]
    #[test_case(json!({"items": {"type": "integer"}}), "[]", 0)]
    #[test_case(json!({"items": [{"type": "integer"}, {"type": "string"}]}), "[1, \"x\", true]", 0; "extra elements are free")]
    #[test_case(json!({"items": [{"type": "integer"}, {"type": "string"}]}), "[\"x\", 1]", 2)]
    #[test_case(json!({"items": {"items": {"type": "integer"}}}), "[[1, 2], [3, \"x\"]]", 1; "nested arrays")]
    fn problem_counts(schema: serde_json::Value, instance: &str, expected: usize) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(problems.len(), expected);
        assert_eq!(valid, expected == 0);
    }
}
