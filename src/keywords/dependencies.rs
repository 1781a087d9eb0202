//! Validator for the `dependencies` keyword, both the required-list and the
//! subschema form.
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::combine::{Conjunction, Disjunction};
use crate::eval::shallow::Shallow;
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::{Event, ParsedEvent};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) enum Dependency {
    Required(Vec<String>),
    Schema(Arc<Schema>),
}

impl Dependency {
    pub(crate) fn required(names: Vec<String>) -> Result<Dependency, BuildError> {
        for (index, name) in names.iter().enumerate() {
            if names[..index].contains(name) {
                return Err(BuildError::DuplicateEntry {
                    keyword: "dependencies",
                });
            }
        }
        Ok(Dependency::Required(names))
    }
}

#[derive(Debug)]
pub(crate) struct Dependencies {
    entries: Vec<(String, Dependency)>,
}

impl Dependencies {
    pub(crate) fn new(entries: Vec<(String, Dependency)>) -> Dependencies {
        Dependencies { entries }
    }
}

impl Keyword for Dependencies {
    fn name(&self) -> &str {
        "dependencies"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let mut value = Map::new();
        for (dependant, dependency) in &self.entries {
            let entry = match dependency {
                Dependency::Required(names) => Value::from(names.clone()),
                Dependency::Schema(schema) => schema.to_json(),
            };
            value.insert(dependant.clone(), entry);
        }
        map.insert("dependencies".to_string(), Value::Object(value));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        let mut children: Vec<Eval> = Vec::with_capacity(self.entries.len());
        for (dependant, dependency) in &self.entries {
            children.push(match dependency {
                Dependency::Required(names) => Shallow::wrap(Box::new(RequiredDependency {
                    dependant: dependant.clone(),
                    names: names.clone(),
                    missing: names.clone(),
                    affirmative,
                    seen: false,
                })),
                Dependency::Schema(schema) => Box::new(SchemaDependency {
                    dependant: dependant.clone(),
                    sub: schema.evaluator(InstanceType::Object, affirmative),
                    buffered: Vec::new(),
                    sub_verdict: None,
                    activated: false,
                    affirmative,
                }),
            });
        }
        Some(match children.len() {
            1 => children.pop().expect("one child is present"),
            _ if affirmative => Conjunction::boxed(children),
            _ => Disjunction::boxed(children, "not", "instance.problem.not.schema", false),
        })
    }
}

/// The required-list form: once the dependant name appears, the listed names
/// form a working set that must drain before the object ends.
struct RequiredDependency {
    dependant: String,
    names: Vec<String>,
    missing: Vec<String>,
    affirmative: bool,
    seen: bool,
}

impl Evaluate for RequiredDependency {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 {
            if let Event::Key(name) = &ev.event {
                if *name == self.dependant {
                    self.seen = true;
                }
                self.missing.retain(|missing| missing != name);
            }
        }
        if depth == 0 && ev.event == Event::EndObject {
            if !self.seen {
                // Never activated: vacuously satisfied, which the negated
                // polarity has to report as a failure.
                return if self.affirmative {
                    Verdict::Ignored
                } else {
                    sink.dispatch(
                        Problem::new("dependencies", "instance.problem.not.dependencies", ev.location)
                            .param("expected", self.names.clone())
                            .param("dependant", self.dependant.clone()),
                    );
                    Verdict::False
                };
            }
            return match (self.affirmative, self.missing.is_empty()) {
                (true, true) => Verdict::True,
                (true, false) => {
                    sink.dispatch(
                        Problem::new("dependencies", "instance.problem.dependencies", ev.location)
                            .param("missing", std::mem::take(&mut self.missing))
                            .param("dependant", self.dependant.clone()),
                    );
                    Verdict::False
                }
                (false, false) => Verdict::True,
                (false, true) => {
                    sink.dispatch(
                        Problem::new("dependencies", "instance.problem.not.dependencies", ev.location)
                            .param("expected", self.names.clone())
                            .param("dependant", self.dependant.clone()),
                    );
                    Verdict::False
                }
            };
        }
        Verdict::Pending
    }
}

/// The subschema form. The subschema evaluates the whole object, but its
/// outcome only matters if the dependant property turns up; problems are
/// buffered until activation and flushed retroactively.
struct SchemaDependency {
    dependant: String,
    sub: Eval,
    buffered: Vec<Problem>,
    sub_verdict: Option<Verdict>,
    activated: bool,
    affirmative: bool,
}

impl Evaluate for SchemaDependency {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 && !self.activated {
            if let Event::Key(name) = &ev.event {
                if *name == self.dependant {
                    self.activated = true;
                    if let Some(verdict) = self.sub_verdict {
                        // The subschema settled while inactive; adopt its
                        // verdict and flush what it reported back then.
                        return self.adopt(verdict, sink);
                    }
                }
            }
        }
        if self.sub_verdict.is_none() {
            let verdict = self.sub.evaluate(ev, depth, &mut self.buffered);
            if verdict.is_final() {
                self.sub_verdict = Some(verdict);
                if self.activated {
                    return self.adopt(verdict, sink);
                }
            }
        }
        if depth == 0 && ev.event == Event::EndObject && !self.activated {
            return if self.affirmative {
                Verdict::Ignored
            } else {
                sink.dispatch(
                    Problem::new("dependencies", "instance.problem.not.schema", ev.location)
                        .param("dependant", self.dependant.clone()),
                );
                Verdict::False
            };
        }
        Verdict::Pending
    }
}

impl SchemaDependency {
    fn adopt(&mut self, verdict: Verdict, sink: &mut dyn ProblemSink) -> Verdict {
        match verdict {
            Verdict::False => {
                for problem in self.buffered.drain(..) {
                    sink.dispatch(problem);
                }
                Verdict::False
            }
            _ => {
                self.buffered.clear();
                Verdict::True
            }
        }
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    let map = match schema {
        Value::Object(map) => map,
        _ => {
            return fail(BuildError::WrongType {
                keyword: "dependencies",
                expected: "an object",
            })
        }
    };
    let mut entries = Vec::with_capacity(map.len());
    for (dependant, dependency) in map {
        let entry = match dependency {
            Value::Array(names) => {
                let mut collected = Vec::with_capacity(names.len());
                for name in names {
                    match name.as_str() {
                        Some(name) => collected.push(name.to_string()),
                        None => {
                            return fail(BuildError::WrongType {
                                keyword: "dependencies",
                                expected: "an array of strings or a schema",
                            })
                        }
                    }
                }
                match Dependency::required(collected) {
                    Ok(dependency) => dependency,
                    Err(error) => return fail(error),
                }
            }
            subschema => match context.subschema(subschema, &["dependencies", dependant]) {
                Ok(compiled) => Dependency::Schema(compiled),
                Err(error) => return fail(error),
            },
        };
        entries.push((dependant.clone(), entry));
    }
    ok(Dependencies::new(entries))
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"a\": 1}", false)]
    #[test_case("{\"a\": 1, \"b\": 2}", true)]
    #[test_case("{\"b\": 2}", true; "dependant absent")]
    #[test_case("{}", true)]
    fn required_form(instance: &str, expected: bool) {
        let (valid, problems) = check(&json!({"dependencies": {"a": ["b"]}}), instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn required_form_problem_parameters() {
        let (_, problems) = check(&json!({"dependencies": {"a": ["b"]}}), "{\"a\": 1}");
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].parameters()[0], ("missing", json!(["b"])));
        assert_eq!(problems[0].parameters()[1], ("dependant", json!("a")));
    }

    #[test_case("{\"a\": 1, \"b\": 2}", true)]
    #[test_case("{\"a\": 1}", false; "activated and violated")]
    #[test_case("{\"x\": 1}", true; "never activated")]
    fn schema_form(instance: &str, expected: bool) {
        let schema = json!({"dependencies": {"a": {"required": ["b"]}}});
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn schema_form_flushes_retroactively() {
        // The dependant arrives after the subschema has already failed.
        let schema = json!({"dependencies": {"z": {"properties": {"a": {"type": "string"}}}}});
        let (valid, problems) = check(&schema, "{\"a\": 1, \"z\": true}");
        assert!(!valid);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].keyword(), "type");
    }
}
