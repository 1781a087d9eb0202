//! The event-driven evaluator engine.
//!
//! An evaluator is a single-use state machine born from a (schema, instance
//! type) pair. It consumes parse events in instance order and settles on one
//! terminal verdict; after that it must not be stepped again. Depth is always
//! relative to the evaluator's own scope: 0 is the value's bracketing events,
//! 1 its direct children.
pub(crate) mod combine;
pub(crate) mod shallow;
pub(crate) mod value;

use crate::events::{Event, Location, ParsedEvent};
use crate::problem::{Problem, ProblemSink};
use serde_json::Value;

/// Tri-state outcome of one evaluation step.
///
/// `Ignored` is produced only by optional evaluators whose activation
/// condition never fired, e.g. the subschema form of `dependencies` when the
/// dependant property is absent. It reads as a vacuous TRUE: every logical
/// parent coerces it. Negated optional evaluators therefore report a plain
/// failure instead of `Ignored` when they never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    True,
    False,
    Pending,
    Ignored,
}

impl Verdict {
    pub fn is_final(self) -> bool {
        self != Verdict::Pending
    }
}

pub(crate) trait Evaluate {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink)
        -> Verdict;
}

pub(crate) type Eval = Box<dyn Evaluate>;

/// The evaluator of the boolean `true` schema and of anything vacuous.
pub(crate) struct AlwaysTrue;

impl Evaluate for AlwaysTrue {
    fn evaluate(&mut self, _: &ParsedEvent, _: usize, _: &mut dyn ProblemSink) -> Verdict {
        Verdict::True
    }
}

/// Fails on the first event with a fixed problem. Produced by the boolean
/// `false` schema, dangling references and negated vacuous schemas.
pub(crate) struct AlwaysFalse {
    keyword: &'static str,
    message_key: &'static str,
    parameters: Vec<(&'static str, Value)>,
}

impl AlwaysFalse {
    pub(crate) fn new(keyword: &'static str, message_key: &'static str) -> AlwaysFalse {
        AlwaysFalse {
            keyword,
            message_key,
            parameters: Vec::new(),
        }
    }

    pub(crate) fn param(mut self, name: &'static str, value: impl Into<Value>) -> AlwaysFalse {
        self.parameters.push((name, value.into()));
        self
    }
}

impl Evaluate for AlwaysFalse {
    fn evaluate(&mut self, ev: &ParsedEvent, _: usize, sink: &mut dyn ProblemSink) -> Verdict {
        let mut problem = Problem::new(self.keyword, self.message_key, ev.location);
        for (name, value) in self.parameters.drain(..) {
            problem = problem.param(name, value);
        }
        sink.dispatch(problem);
        Verdict::False
    }
}

/// A predicate over a value's first event, together with its failure
/// problems. Drives every single-event assertion (`type`, numeric bounds,
/// string assertions, `format`, scalar `const`/`enum`).
pub(crate) trait Assertion: Send + Sync {
    fn test(&self, event: &Event) -> bool;
    /// Problem for the affirmative assertion failing.
    fn problem(&self, event: &Event, location: Location) -> Problem;
    /// Problem for the negated assertion failing, i.e. the instance matched.
    fn negated_problem(&self, event: &Event, location: Location) -> Problem;
}

/// Evaluates an `Assertion` on the first event of the value, in either
/// polarity.
pub(crate) struct AssertionEval<A> {
    assertion: A,
    affirmative: bool,
}

impl<A: Assertion> AssertionEval<A> {
    pub(crate) fn new(assertion: A, affirmative: bool) -> AssertionEval<A> {
        AssertionEval {
            assertion,
            affirmative,
        }
    }

    pub(crate) fn boxed(assertion: A, affirmative: bool) -> Eval
    where
        A: 'static,
    {
        Box::new(AssertionEval::new(assertion, affirmative))
    }
}

impl<A: Assertion> Evaluate for AssertionEval<A> {
    fn evaluate(&mut self, ev: &ParsedEvent, _: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if self.assertion.test(&ev.event) == self.affirmative {
            Verdict::True
        } else {
            let problem = if self.affirmative {
                self.assertion.problem(&ev.event, ev.location)
            } else {
                self.assertion.negated_problem(&ev.event, ev.location)
            };
            sink.dispatch(problem);
            Verdict::False
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::events::{EventSource, SyntaxError};
    use crate::instance_type::InstanceType;
    use crate::schemas::Schema;
    use crate::tokenizer::Tokenizer;
    use std::sync::Arc;

    /// Drive a single evaluator over a JSON text, the way the engine would.
    pub(crate) fn run(eval: &mut dyn Evaluate, text: &str) -> (Verdict, Vec<Problem>) {
        let mut tokenizer = Tokenizer::new(text);
        let mut problems = Vec::new();
        let mut depth = 0usize;
        let mut verdict = Verdict::Pending;
        while let Some(result) = tokenizer.next_event() {
            let ev: Result<_, SyntaxError> = result;
            let ev = ev.expect("valid JSON");
            let at = match ev.event {
                Event::StartObject | Event::StartArray => {
                    let at = depth;
                    depth += 1;
                    at
                }
                Event::EndObject | Event::EndArray => {
                    depth -= 1;
                    depth
                }
                _ => depth,
            };
            if !verdict.is_final() {
                verdict = eval.evaluate(&ev, at, &mut problems);
            }
        }
        (verdict, problems)
    }

    /// Compile-time type discovery plus a full drive of the schema's
    /// evaluator, mirroring what the validator does for one value.
    pub(crate) fn run_schema(
        schema: &Arc<Schema>,
        affirmative: bool,
        text: &str,
    ) -> (Verdict, Vec<Problem>) {
        let mut tokenizer = Tokenizer::new(text);
        let mut events = Vec::new();
        while let Some(result) = tokenizer.next_event() {
            let ev: Result<_, SyntaxError> = result;
            events.push(ev.expect("valid JSON"));
        }
        let ty = InstanceType::of(&events[0].event).expect("a value event");
        let mut eval = schema.evaluator(ty, affirmative);
        let mut problems = Vec::new();
        let mut depth = 0usize;
        let mut verdict = Verdict::Pending;
        for ev in &events {
            let at = match ev.event {
                Event::StartObject | Event::StartArray => {
                    let at = depth;
                    depth += 1;
                    at
                }
                Event::EndObject | Event::EndArray => {
                    depth -= 1;
                    depth
                }
                _ => depth,
            };
            if !verdict.is_final() {
                verdict = eval.evaluate(ev, at, &mut problems);
            }
        }
        (verdict, problems)
    }

    /// Shorthand: affirmative run, returning whether the instance is valid
    /// plus the dispatched problems.
    pub(crate) fn check(schema: &serde_json::Value, text: &str) -> (bool, Vec<Problem>) {
        let schema = Schema::compile(schema).expect("a valid schema");
        let (verdict, problems) = run_schema(&schema, true, text);
        (matches!(verdict, Verdict::True | Verdict::Ignored), problems)
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::run;
    use super::*;

    #[test]
    fn always_true() {
        let (verdict, problems) = run(&mut AlwaysTrue, "17");
        assert_eq!(verdict, Verdict::True);
        assert!(problems.is_empty());
    }

    #[test]
    fn always_false_reports_once() {
        let mut eval = AlwaysFalse::new("false", "instance.problem.unacceptable");
        let (verdict, problems) = run(&mut eval, "{\"a\": 1}");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].keyword(), "false");
    }
}
