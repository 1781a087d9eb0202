//! A pull-style JSON tokenizer with row/column tracking.
//!
//! This is the event source the CLI wires to files. The engine itself only
//! depends on the `EventSource` trait, so hosts may substitute their own.
use crate::events::{Event, EventSource, JsonNumber, Location, ParsedEvent, SyntaxError};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    Value,
    ValueOrEndArray,
    KeyOrEnd,
    Key,
    Colon,
    CommaOrEndObject,
    CommaOrEndArray,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Object,
    Array,
}

/// Tokenizes a complete JSON text held in memory.
#[derive(Debug)]
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    row: u64,
    col: u64,
    stack: Vec<Container>,
    expect: Expect,
    failed: bool,
}

impl Tokenizer {
    pub fn new(text: &str) -> Tokenizer {
        Tokenizer {
            input: text.chars().collect(),
            pos: 0,
            row: 1,
            col: 1,
            stack: Vec::new(),
            expect: Expect::Value,
            failed: false,
        }
    }

    fn location(&self) -> Location {
        Location::new(self.row, self.col)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
            self.bump();
        }
    }

    fn error(&mut self, message: impl Into<String>) -> SyntaxError {
        self.failed = true;
        SyntaxError {
            message: message.into(),
            location: self.location(),
        }
    }

    fn error_at(&mut self, location: Location, message: impl Into<String>) -> SyntaxError {
        self.failed = true;
        SyntaxError {
            message: message.into(),
            location,
        }
    }

    fn expect_literal(&mut self, rest: &str) -> Result<(), SyntaxError> {
        for expected in rest.chars() {
            match self.bump() {
                Some(c) if c == expected => {}
                _ => return Err(self.error("invalid literal")),
            }
        }
        Ok(())
    }

    fn lex_string(&mut self) -> Result<String, SyntaxError> {
        // Opening quote already consumed.
        let mut out = String::new();
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(self.error("unterminated string")),
            };
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let escape = match self.bump() {
                        Some(c) => c,
                        None => return Err(self.error("unterminated escape sequence")),
                    };
                    match escape {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'b' => out.push('\u{0008}'),
                        'f' => out.push('\u{000C}'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => {
                            let first = self.lex_code_unit()?;
                            if (0xD800..0xDC00).contains(&first) {
                                // High surrogate; a low surrogate escape must follow.
                                if self.bump() != Some('\\') || self.bump() != Some('u') {
                                    return Err(self.error("unpaired surrogate"));
                                }
                                let second = self.lex_code_unit()?;
                                if !(0xDC00..0xE000).contains(&second) {
                                    return Err(self.error("unpaired surrogate"));
                                }
                                let merged =
                                    0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                                match char::from_u32(merged) {
                                    Some(c) => out.push(c),
                                    None => return Err(self.error("invalid surrogate pair")),
                                }
                            } else {
                                match char::from_u32(first) {
                                    Some(c) => out.push(c),
                                    None => return Err(self.error("unpaired surrogate")),
                                }
                            }
                        }
                        _ => return Err(self.error("invalid escape sequence")),
                    }
                }
                c if (c as u32) < 0x20 => {
                    return Err(self.error("unescaped control character in string"))
                }
                c => out.push(c),
            }
        }
    }

    fn lex_code_unit(&mut self) -> Result<u32, SyntaxError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = match self.bump().and_then(|c| c.to_digit(16)) {
                Some(d) => d,
                None => return Err(self.error("invalid unicode escape")),
            };
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn lex_number(&mut self, first: char) -> Result<JsonNumber, SyntaxError> {
        let start = self.location();
        let mut literal = String::new();
        literal.push(first);
        let mut integer_digits = first.is_ascii_digit();
        if first == '-' {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => {
                    integer_digits = true;
                    literal.push(c);
                    self.bump();
                }
                _ => return Err(self.error("a digit must follow the minus sign")),
            }
        }
        if !integer_digits {
            return Err(self.error("invalid number"));
        }
        // No leading zeros.
        let leading = literal.chars().last().map_or(false, |c| c == '0');
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                if leading && literal.trim_start_matches('-') == "0" {
                    return Err(self.error("leading zeros are not allowed"));
                }
                literal.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') {
            literal.push('.');
            self.bump();
            let mut any = false;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    literal.push(c);
                    self.bump();
                    any = true;
                } else {
                    break;
                }
            }
            if !any {
                return Err(self.error("a digit must follow the decimal point"));
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            literal.push('e');
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                let sign = self.peek().unwrap_or('+');
                literal.push(sign);
                self.bump();
            }
            let mut any = false;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    literal.push(c);
                    self.bump();
                    any = true;
                } else {
                    break;
                }
            }
            if !any {
                return Err(self.error("a digit must follow the exponent"));
            }
        }
        match JsonNumber::new(&literal) {
            Some(number) => Ok(number),
            None => Err(self.error_at(start, "number out of range")),
        }
    }

    fn after_value(&mut self) {
        self.expect = match self.stack.last() {
            Some(Container::Object) => Expect::CommaOrEndObject,
            Some(Container::Array) => Expect::CommaOrEndArray,
            None => Expect::Eof,
        };
    }

    fn lex_value(&mut self, c: char, location: Location) -> Result<ParsedEvent, SyntaxError> {
        let event = match c {
            '{' => {
                self.stack.push(Container::Object);
                self.expect = Expect::KeyOrEnd;
                Event::StartObject
            }
            '[' => {
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEndArray;
                Event::StartArray
            }
            '"' => {
                let value = self.lex_string()?;
                self.after_value();
                Event::String(value)
            }
            't' => {
                self.expect_literal("rue")?;
                self.after_value();
                Event::Bool(true)
            }
            'f' => {
                self.expect_literal("alse")?;
                self.after_value();
                Event::Bool(false)
            }
            'n' => {
                self.expect_literal("ull")?;
                self.after_value();
                Event::Null
            }
            c if c == '-' || c.is_ascii_digit() => {
                let number = self.lex_number(c)?;
                self.after_value();
                Event::Number(number)
            }
            _ => return Err(self.error_at(location, format!("unexpected character '{}'", c))),
        };
        Ok(ParsedEvent::new(event, location))
    }

    fn close(&mut self, container: Container, location: Location) -> ParsedEvent {
        self.stack.pop();
        self.after_value();
        let event = match container {
            Container::Object => Event::EndObject,
            Container::Array => Event::EndArray,
        };
        ParsedEvent::new(event, location)
    }

    fn step(&mut self) -> Option<Result<ParsedEvent, SyntaxError>> {
        self.skip_whitespace();
        let location = self.location();
        let c = match self.peek() {
            Some(c) => c,
            None => {
                if self.expect == Expect::Eof {
                    return None;
                }
                return Some(Err(self.error("unexpected end of input")));
            }
        };
        match self.expect {
            Expect::Eof => Some(Err(self.error("unexpected trailing content"))),
            Expect::Value | Expect::ValueOrEndArray => {
                if c == ']' && self.expect == Expect::ValueOrEndArray {
                    self.bump();
                    return Some(Ok(self.close(Container::Array, location)));
                }
                self.bump();
                Some(self.lex_value(c, location))
            }
            Expect::KeyOrEnd | Expect::Key => {
                self.bump();
                match c {
                    '}' if self.expect == Expect::KeyOrEnd => {
                        Some(Ok(self.close(Container::Object, location)))
                    }
                    '"' => match self.lex_string() {
                        Ok(name) => {
                            self.expect = Expect::Colon;
                            Some(Ok(ParsedEvent::new(Event::Key(name), location)))
                        }
                        Err(e) => Some(Err(e)),
                    },
                    _ => Some(Err(self.error_at(location, "expected a property name"))),
                }
            }
            Expect::Colon => {
                self.bump();
                if c == ':' {
                    self.expect = Expect::Value;
                    self.step()
                } else {
                    Some(Err(self.error_at(location, "expected ':'")))
                }
            }
            Expect::CommaOrEndObject => {
                self.bump();
                match c {
                    ',' => {
                        self.expect = Expect::Key;
                        self.step()
                    }
                    '}' => Some(Ok(self.close(Container::Object, location))),
                    _ => Some(Err(self.error_at(location, "expected ',' or '}'"))),
                }
            }
            Expect::CommaOrEndArray => {
                self.bump();
                match c {
                    ',' => {
                        self.expect = Expect::Value;
                        self.step()
                    }
                    ']' => Some(Ok(self.close(Container::Array, location))),
                    _ => Some(Err(self.error_at(location, "expected ',' or ']'"))),
                }
            }
        }
    }
}

impl EventSource for Tokenizer {
    fn next_event(&mut self) -> Option<Result<ParsedEvent, SyntaxError>> {
        if self.failed {
            return None;
        }
        self.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(text: &str) -> Vec<Event> {
        let mut tokenizer = Tokenizer::new(text);
        let mut out = Vec::new();
        while let Some(result) = tokenizer.next_event() {
            out.push(result.expect("valid JSON").event);
        }
        out
    }

    #[test]
    fn scalar() {
        assert_eq!(events("42"), vec![Event::Number(JsonNumber::new("42").unwrap())]);
        assert_eq!(events("\"x\""), vec![Event::String("x".to_string())]);
        assert_eq!(events("null"), vec![Event::Null]);
    }

    #[test]
    fn nested_structure() {
        let got = events(r#"{"a": [1, {"b": true}], "c": null}"#);
        assert_eq!(
            got,
            vec![
                Event::StartObject,
                Event::Key("a".to_string()),
                Event::StartArray,
                Event::Number(JsonNumber::new("1").unwrap()),
                Event::StartObject,
                Event::Key("b".to_string()),
                Event::Bool(true),
                Event::EndObject,
                Event::EndArray,
                Event::Key("c".to_string()),
                Event::Null,
                Event::EndObject,
            ]
        );
    }

    #[test]
    fn empty_containers() {
        assert_eq!(events("[]"), vec![Event::StartArray, Event::EndArray]);
        assert_eq!(events("{}"), vec![Event::StartObject, Event::EndObject]);
    }

    #[test]
    fn surrogate_pair() {
        assert_eq!(
            events(r#""😀""#),
            vec![Event::String("\u{1F600}".to_string())]
        );
    }

    #[test]
    fn locations_are_tracked() {
        let mut tokenizer = Tokenizer::new("{\n  \"a\": 1\n}");
        let first = tokenizer.next_event().unwrap().unwrap();
        assert_eq!(first.location, Location::new(1, 1));
        let key = tokenizer.next_event().unwrap().unwrap();
        assert_eq!(key.location, Location::new(2, 3));
        let value = tokenizer.next_event().unwrap().unwrap();
        assert_eq!(value.location, Location::new(2, 8));
    }

    #[test]
    fn reports_trailing_content() {
        let mut tokenizer = Tokenizer::new("1 2");
        assert!(tokenizer.next_event().unwrap().is_ok());
        assert!(tokenizer.next_event().unwrap().is_err());
        assert!(tokenizer.next_event().is_none());
    }

    #[test]
    fn rejects_trailing_comma() {
        let mut tokenizer = Tokenizer::new("[1, ]");
        assert!(tokenizer.next_event().unwrap().is_ok());
        assert!(tokenizer.next_event().unwrap().is_ok());
        assert!(tokenizer.next_event().unwrap().is_err());
    }

    #[test]
    fn rejects_leading_zero() {
        let mut tokenizer = Tokenizer::new("01");
        assert!(tokenizer.next_event().unwrap().is_err());
    }
}
