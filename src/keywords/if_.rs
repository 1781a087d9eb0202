//! Validator for the `if`/`then`/`else` conditional.
//!
//! All three subschemas see the same event stream in lockstep because the
//! input cannot be re-read; the condition's own problems are evaluated
//! silently and never surface. Once `if` settles, only the selected branch's
//! outcome and problems count.
use super::{fail, ok, CompileResult, Keyword};
use crate::eval::{Eval, Evaluate, Verdict};
use crate::events::ParsedEvent;
use crate::instance_type::InstanceType;
use crate::problem::{Discard, Problem, ProblemSink};
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct IfThenElse {
    condition: Arc<Schema>,
    then_schema: Option<Arc<Schema>>,
    else_schema: Option<Arc<Schema>>,
}

impl IfThenElse {
    pub(crate) fn new(
        condition: Arc<Schema>,
        then_schema: Option<Arc<Schema>>,
        else_schema: Option<Arc<Schema>>,
    ) -> IfThenElse {
        IfThenElse {
            condition,
            then_schema,
            else_schema,
        }
    }
}

impl Keyword for IfThenElse {
    fn name(&self) -> &str {
        "if"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("if".to_string(), self.condition.to_json());
        if let Some(schema) = &self.then_schema {
            map.insert("then".to_string(), schema.to_json());
        }
        if let Some(schema) = &self.else_schema {
            map.insert("else".to_string(), schema.to_json());
        }
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        Some(Box::new(ConditionalEvaluator {
            condition: Branch::new(self.condition.evaluator(ty, true)),
            then_branch: self
                .then_schema
                .as_ref()
                .map(|schema| Branch::new(schema.evaluator(ty, affirmative))),
            else_branch: self
                .else_schema
                .as_ref()
                .map(|schema| Branch::new(schema.evaluator(ty, affirmative))),
            affirmative,
        }))
    }
}

struct Branch {
    eval: Option<Eval>,
    verdict: Option<Verdict>,
    problems: Vec<Problem>,
}

impl Branch {
    fn new(eval: Eval) -> Branch {
        Branch {
            eval: Some(eval),
            verdict: None,
            problems: Vec::new(),
        }
    }

    fn step(&mut self, ev: &ParsedEvent, depth: usize) {
        if let Some(eval) = self.eval.as_mut() {
            let verdict = eval.evaluate(ev, depth, &mut self.problems);
            if verdict.is_final() {
                self.verdict = Some(verdict);
                self.eval = None;
            }
        }
    }

    fn step_silently(&mut self, ev: &ParsedEvent, depth: usize) {
        if let Some(eval) = self.eval.as_mut() {
            let verdict = eval.evaluate(ev, depth, &mut Discard);
            if verdict.is_final() {
                self.verdict = Some(verdict);
                self.eval = None;
            }
        }
    }

    fn satisfied(&self) -> Option<bool> {
        self.verdict
            .map(|verdict| matches!(verdict, Verdict::True | Verdict::Ignored))
    }
}

struct ConditionalEvaluator {
    condition: Branch,
    then_branch: Option<Branch>,
    else_branch: Option<Branch>,
    affirmative: bool,
}

impl ConditionalEvaluator {
    /// Outcome once both the condition and the selected branch have settled.
    fn conclude(&mut self, ev: &ParsedEvent, sink: &mut dyn ProblemSink) -> Verdict {
        let follow_then = match self.condition.satisfied() {
            Some(follow_then) => follow_then,
            None => return Verdict::Pending,
        };
        let selected = if follow_then {
            self.then_branch.as_mut()
        } else {
            self.else_branch.as_mut()
        };
        match selected {
            Some(branch) => match branch.satisfied() {
                Some(true) => Verdict::True,
                Some(false) => {
                    for problem in branch.problems.drain(..) {
                        sink.dispatch(problem);
                    }
                    Verdict::False
                }
                None => Verdict::Pending,
            },
            // An absent branch accepts; its negation rejects.
            None => {
                if self.affirmative {
                    Verdict::True
                } else {
                    sink.dispatch(Problem::new("not", "instance.problem.not.schema", ev.location));
                    Verdict::False
                }
            }
        }
    }
}

impl Evaluate for ConditionalEvaluator {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        self.condition.step_silently(ev, depth);
        if let Some(branch) = self.then_branch.as_mut() {
            branch.step(ev, depth);
        }
        if let Some(branch) = self.else_branch.as_mut() {
            branch.step(ev, depth);
        }
        self.conclude(ev, sink)
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    let then_schema = match parent.get("then") {
        Some(subschema) => match context.subschema(subschema, &["then"]) {
            Ok(compiled) => Some(compiled),
            Err(error) => return fail(error),
        },
        None => None,
    };
    let else_schema = match parent.get("else") {
        Some(subschema) => match context.subschema(subschema, &["else"]) {
            Ok(compiled) => Some(compiled),
            Err(error) => return fail(error),
        },
        None => None,
    };
    if then_schema.is_none() && else_schema.is_none() {
        // A bare `if` asserts nothing; compile the condition anyway so its
        // own structure is checked and referencable.
        return match context.subschema(schema, &["if"]) {
            Ok(_) => None,
            Err(error) => fail(error),
        };
    }
    match context.subschema(schema, &["if"]) {
        Ok(condition) => ok(IfThenElse::new(condition, then_schema, else_schema)),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    fn schema() -> serde_json::Value {
        json!({
            "if": {"properties": {"t": {"const": "x"}}, "required": ["t"]},
            "then": {"required": ["x"]},
            "else": {"required": ["y"]}
        })
    }

    #[test_case("{\"t\": \"x\", \"x\": 1}", true; "then satisfied")]
    #[test_case("{\"t\": \"x\"}", false; "then violated")]
    #[test_case("{\"t\": \"z\", \"y\": 1}", true; "else satisfied")]
    #[test_case("{\"t\": \"z\"}", false; "else violated")]
    fn verdicts(instance: &str, expected: bool) {
        let (valid, problems) = check(&schema(), instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn condition_problems_never_surface() {
        let (_, problems) = check(&schema(), "{\"t\": \"z\"}");
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].keyword(), "required");
        assert_eq!(problems[0].parameters()[0], ("missing", json!(["y"])));
    }

    #[test]
    fn bare_if_is_inert() {
        let (valid, _) = check(&json!({"if": {"type": "integer"}}), "\"x\"");
        assert!(valid);
    }

    #[test]
    fn missing_then_accepts() {
        let schema = json!({"if": {"type": "integer"}, "else": {"type": "string"}});
        let (valid, _) = check(&schema, "5");
        assert!(valid);
        let (valid, _) = check(&schema, "\"x\"");
        assert!(valid);
        let (valid, _) = check(&schema, "true");
        assert!(!valid);
    }
}
