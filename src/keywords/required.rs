//! Validator for the `required` keyword.
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
pub(crate) struct Required {
    names: Vec<String>,
}

impl Required {
    pub(crate) fn new(names: Vec<String>) -> Result<Required, BuildError> {
        if names.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "required" });
        }
        for (index, name) in names.iter().enumerate() {
            if names[..index].contains(name) {
                return Err(BuildError::DuplicateEntry { keyword: "required" });
            }
        }
        Ok(Required { names })
    }
}

impl Keyword for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::Object
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("required".to_string(), Value::from(self.names.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::Object {
            return None;
        }
        Some(Shallow::wrap(Box::new(RequiredEvaluator {
            names: self.names.clone(),
            missing: self.names.clone(),
            affirmative,
        })))
    }
}

struct RequiredEvaluator {
    names: Vec<String>,
    missing: Vec<String>,
    affirmative: bool,
}

impl Evaluate for RequiredEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth == 1 {
            if let Event::Key(name) = &ev.event {
                self.missing.retain(|missing| missing != name);
                if self.missing.is_empty() {
                    return if self.affirmative {
                        Verdict::True
                    } else {
                        sink.dispatch(
                            Problem::new("required", "instance.problem.not.required", ev.location)
                                .param("expected", self.names.clone()),
                        );
                        Verdict::False
                    };
                }
            }
        }
        if depth == 0 && ev.event == Event::EndObject {
            return if self.affirmative {
                sink.dispatch(
                    Problem::new("required", "instance.problem.required", ev.location)
                        .param("missing", std::mem::take(&mut self.missing)),
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
    let names = match schema {
        Value::Array(names) => {
            let mut collected = Vec::with_capacity(names.len());
            for name in names {
                match name.as_str() {
                    Some(name) => collected.push(name.to_string()),
                    None => {
                        return fail(BuildError::WrongType {
                            keyword: "required",
                            expected: "an array of strings",
                        })
                    }
                }
            }
            collected
        }
        _ => {
            return fail(BuildError::WrongType {
                keyword: "required",
                expected: "an array of strings",
            })
        }
    };
    match Required::new(names) {
        Ok(keyword) => ok(keyword),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("{\"a\": 1, \"b\": 2}", true)]
    #[test_case("{\"b\": 2, \"a\": 1}", true; "order free")]
    #[test_case("{\"a\": 1}", false)]
    #[test_case("{}", false)]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, problems) = check(&json!({"required": ["a", "b"]}), instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn lists_the_missing_names() {
        let (_, problems) = check(&json!({"required": ["a", "b"]}), "{\"b\": 2}");
        assert_eq!(problems[0].parameters()[0], ("missing", json!(["a"])));
    }

    #[test]
    fn rejects_bad_schemas() {
        assert!(Schema::compile(&json!({"required": []})).is_err());
        assert!(Schema::compile(&json!({"required": ["a", "a"]})).is_err());
        assert!(Schema::compile(&json!({"required": [1]})).is_err());
    }
}
