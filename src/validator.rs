//! The streaming engine driver and its output surfaces.
//!
//! The driver pulls events from a source, keeps the absolute depth, creates
//! the top-level evaluator the moment the instance's type is known and pumps
//! it until it settles. Every event is handed back to the caller unchanged;
//! problems divert to the handler, all of them before the next event is
//! touched.
use crate::eval::{Eval, Verdict};
use crate::events::{Event, EventSource, ParsedEvent, SyntaxError};
use crate::instance_type::InstanceType;
use crate::problem::{Problem, ProblemSink};
use crate::schemas::Schema;
use crate::tokenizer::Tokenizer;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

struct HandlerSink<'a, H: FnMut(Problem)> {
    handler: &'a mut H,
}

impl<'a, H: FnMut(Problem)> ProblemSink for HandlerSink<'a, H> {
    fn dispatch(&mut self, problem: Problem) {
        (self.handler)(problem);
    }
}

/// An event source that validates while forwarding events unchanged.
pub struct ValidatingSource<S: EventSource, H: FnMut(Problem)> {
    source: S,
    schema: Arc<Schema>,
    handler: H,
    eval: Option<Eval>,
    verdict: Option<Verdict>,
    depth: usize,
}

impl<S: EventSource, H: FnMut(Problem)> ValidatingSource<S, H> {
    pub fn new(schema: Arc<Schema>, source: S, handler: H) -> ValidatingSource<S, H> {
        ValidatingSource {
            source,
            schema,
            handler,
            eval: None,
            verdict: None,
            depth: 0,
        }
    }

    /// The overall verdict, available once the instance has been consumed.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
            .map(|verdict| matches!(verdict, Verdict::True | Verdict::Ignored))
    }

    fn feed(&mut self, ev: &ParsedEvent) {
        let at = match ev.event {
            Event::StartObject | Event::StartArray => {
                let at = self.depth;
                self.depth += 1;
                at
            }
            Event::EndObject | Event::EndArray => {
                self.depth = self.depth.saturating_sub(1);
                self.depth
            }
            _ => self.depth,
        };
        if self.verdict.is_some() {
            return;
        }
        if self.eval.is_none() {
            let ty = match InstanceType::of(&ev.event) {
                Some(ty) => ty,
                None => return,
            };
            self.eval = Some(self.schema.evaluator(ty, true));
        }
        if let Some(eval) = self.eval.as_mut() {
            let mut sink = HandlerSink {
                handler: &mut self.handler,
            };
            let verdict = eval.evaluate(ev, at, &mut sink);
            if verdict.is_final() {
                self.verdict = Some(verdict);
                self.eval = None;
            }
        }
    }
}

impl<S: EventSource, H: FnMut(Problem)> fmt::Debug for ValidatingSource<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingSource")
            .field("schema", &self.schema)
            .field("verdict", &self.verdict)
            .field("depth", &self.depth)
            .finish()
    }
}

impl<S: EventSource, H: FnMut(Problem)> EventSource for ValidatingSource<S, H> {
    fn next_event(&mut self) -> Option<Result<ParsedEvent, SyntaxError>> {
        match self.source.next_event()? {
            Ok(ev) => {
                self.feed(&ev);
                Some(Ok(ev))
            }
            // Tokenizer errors propagate unchanged.
            Err(error) => Some(Err(error)),
        }
    }
}

/// Drain a source entirely, returning the rebuilt value plus the problems.
#[derive(Debug)]
pub struct ValueReader;

impl ValueReader {
    pub fn read<S: EventSource>(
        schema: &Arc<Schema>,
        source: S,
    ) -> Result<(Option<Value>, Vec<Problem>), SyntaxError> {
        let mut problems = Vec::new();
        let mut builder = crate::eval::value::ValueBuilder::new();
        let mut value = None;
        {
            let mut validating =
                ValidatingSource::new(Arc::clone(schema), source, |problem| problems.push(problem));
            while let Some(result) = validating.next_event() {
                let ev = result?;
                if value.is_none() && builder.feed(&ev.event) {
                    value = builder.take();
                }
            }
        }
        Ok((value, problems))
    }
}

/// Validate everything a source yields and collect the problems.
pub fn validate<S: EventSource>(
    schema: &Arc<Schema>,
    source: S,
) -> Result<Vec<Problem>, SyntaxError> {
    let mut problems = Vec::new();
    let mut validating =
        ValidatingSource::new(Arc::clone(schema), source, |problem| problems.push(problem));
    while let Some(result) = validating.next_event() {
        result?;
    }
    drop(validating);
    Ok(problems)
}

/// Validate a JSON text against a compiled schema.
pub fn validate_str(schema: &Arc<Schema>, text: &str) -> Result<Vec<Problem>, SyntaxError> {
    validate(schema, Tokenizer::new(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forwards_every_event_unchanged() {
        let schema = Schema::compile(&json!({"type": "object"})).unwrap();
        let text = r#"{"a": [1, 2], "b": "x"}"#;
        let mut plain = Tokenizer::new(text);
        let mut validating = ValidatingSource::new(schema, Tokenizer::new(text), |_| {});
        loop {
            match (plain.next_event(), validating.next_event()) {
                (None, None) => break,
                (Some(Ok(expected)), Some(Ok(got))) => {
                    assert_eq!(expected.event, got.event);
                    assert_eq!(expected.location, got.location);
                }
                other => panic!("event streams diverged: {:?}", other.0.is_some()),
            }
        }
    }

    #[test]
    fn verdict_is_available_after_the_stream() {
        let schema = Schema::compile(&json!({"maximum": 5})).unwrap();
        let mut validating = ValidatingSource::new(schema, Tokenizer::new("7"), |_| {});
        while let Some(result) = validating.next_event() {
            result.unwrap();
        }
        assert_eq!(validating.verdict(), Some(false));
    }

    #[test]
    fn value_reader_returns_value_and_problems() {
        let schema = Schema::compile(&json!({"required": ["b"]})).unwrap();
        let (value, problems) =
            ValueReader::read(&schema, Tokenizer::new(r#"{"a": 1}"#)).unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn problem_locations_point_into_the_source() {
        let schema = Schema::compile(&json!({"properties": {"a": {"type": "string"}}})).unwrap();
        let problems = validate_str(&schema, "{\n  \"a\": 17\n}").unwrap();
        assert_eq!(problems.len(), 1);
        let location = problems[0].location();
        assert_eq!((location.row, location.col), (2, 8));
    }

    #[test]
    fn syntax_errors_propagate() {
        let schema = Schema::compile(&json!(true)).unwrap();
        assert!(validate_str(&schema, "{oops}").is_err());
    }
}
