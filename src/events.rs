//! Parse events and the pull-style source abstraction the engine consumes.
use serde_json::Number;
use std::fmt;

/// Row/column position of a token within the input document. Both are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub row: u64,
    pub col: u64,
}

impl Location {
    pub(crate) fn new(row: u64, col: u64) -> Location {
        Location { row, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.row, self.col)
    }
}

/// A JSON number as it appeared in the input.
///
/// The source lexeme is kept next to the parsed representation so that
/// exact-decimal keywords (`multipleOf`) never observe binary rounding.
#[derive(Debug, Clone)]
pub struct JsonNumber {
    literal: Box<str>,
    parsed: Number,
}

impl JsonNumber {
    pub fn new(literal: &str) -> Option<JsonNumber> {
        let parsed = parse_number(literal)?;
        Some(JsonNumber {
            literal: literal.into(),
            parsed,
        })
    }

    /// The number exactly as written in the document.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn value(&self) -> &Number {
        &self.parsed
    }

    /// Whether the number is equal to a mathematical integer. `1.0` is.
    pub fn is_integral(&self) -> bool {
        if self.parsed.is_i64() || self.parsed.is_u64() {
            return true;
        }
        match self.parsed.as_f64() {
            Some(value) => value.fract() == 0.0 && value.is_finite(),
            None => false,
        }
    }
}

impl PartialEq for JsonNumber {
    fn eq(&self, other: &JsonNumber) -> bool {
        self.parsed.as_f64() == other.parsed.as_f64()
    }
}

fn parse_number(literal: &str) -> Option<Number> {
    if let Ok(number) = serde_json::from_str::<Number>(literal) {
        return Some(number);
    }
    // Out-of-range lexemes like `1e400` are syntactically valid JSON.
    literal.parse::<f64>().ok().and_then(Number::from_f64)
}

/// One structural step of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key(String),
    String(String),
    Number(JsonNumber),
    Bool(bool),
    Null,
}

impl Event {
    /// `true` for events that carry a value or open one, i.e. everything
    /// except `Key` and the closing brackets.
    pub(crate) fn opens_value(&self) -> bool {
        !matches!(self, Event::Key(_) | Event::EndObject | Event::EndArray)
    }
}

/// An event paired with where it came from.
#[derive(Debug, Clone)]
pub struct ParsedEvent {
    pub event: Event,
    pub location: Location,
}

impl ParsedEvent {
    pub fn new(event: Event, location: Location) -> ParsedEvent {
        ParsedEvent { event, location }
    }
}

/// A malformed instance document. Produced by event sources, never by the
/// engine itself; the engine propagates it unchanged.
#[derive(Debug)]
pub struct SyntaxError {
    pub message: String,
    pub location: Location,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.location, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Pull-style supplier of parse events.
///
/// The engine does not own a tokenizer; anything producing well-formed event
/// sequences can drive validation.
pub trait EventSource {
    /// The next event, `None` on end of input.
    fn next_event(&mut self) -> Option<Result<ParsedEvent, SyntaxError>>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Option<Result<ParsedEvent, SyntaxError>> {
        (**self).next_event()
    }
}

/// Replays a pre-built sequence of events. Mostly useful in tests and for
/// feeding single synthesized values to sub-evaluators.
#[derive(Debug)]
pub struct SliceSource {
    events: std::vec::IntoIter<ParsedEvent>,
}

impl SliceSource {
    pub fn new(events: Vec<ParsedEvent>) -> SliceSource {
        SliceSource {
            events: events.into_iter(),
        }
    }
}

impl EventSource for SliceSource {
    fn next_event(&mut self) -> Option<Result<ParsedEvent, SyntaxError>> {
        self.events.next().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers() {
        assert!(JsonNumber::new("1").unwrap().is_integral());
        assert!(JsonNumber::new("1.0").unwrap().is_integral());
        assert!(JsonNumber::new("1e2").unwrap().is_integral());
        assert!(!JsonNumber::new("100.5").unwrap().is_integral());
    }

    #[test]
    fn numeric_equality_ignores_lexeme() {
        assert_eq!(
            JsonNumber::new("1").unwrap(),
            JsonNumber::new("1.0").unwrap()
        );
        assert_eq!(
            JsonNumber::new("1").unwrap(),
            JsonNumber::new("1e0").unwrap()
        );
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new(3, 14).to_string(), "[3,14]");
    }
}
