//! Rebuilding JSON values from events.
//!
//! `const`, `enum` and `uniqueItems` compare whole values structurally and
//! therefore need them materialized. This is a bounded, documented exception
//! to the streaming principle; buffers live only for the value being compared.
use crate::events::Event;
use serde_json::{Map, Value};

/// Structural equality with numbers canonicalised by numerical value, so
/// `1`, `1.0` and `1e0` are the same value. Objects compare order-insensitively.
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| equal(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, l)| right.get(key).map_or(false, |r| equal(l, r)))
        }
        (_, _) => left == right,
    }
}

enum Frame {
    Array(Vec<Value>),
    Object(Map<String, Value>, Option<String>),
}

/// Accumulates events into a `serde_json::Value`. Complete once the value's
/// closing event (or its only event, for scalars) has been fed.
pub(crate) struct ValueBuilder {
    stack: Vec<Frame>,
    result: Option<Value>,
}

impl ValueBuilder {
    pub(crate) fn new() -> ValueBuilder {
        ValueBuilder {
            stack: Vec::new(),
            result: None,
        }
    }

    /// Feed the next event; returns `true` once the value is complete.
    pub(crate) fn feed(&mut self, event: &Event) -> bool {
        match event {
            Event::StartObject => {
                self.stack.push(Frame::Object(Map::new(), None));
                false
            }
            Event::StartArray => {
                self.stack.push(Frame::Array(Vec::new()));
                false
            }
            Event::Key(name) => {
                if let Some(Frame::Object(_, pending)) = self.stack.last_mut() {
                    *pending = Some(name.clone());
                }
                false
            }
            Event::EndObject => {
                if let Some(Frame::Object(map, _)) = self.stack.pop() {
                    self.complete(Value::Object(map))
                } else {
                    false
                }
            }
            Event::EndArray => {
                if let Some(Frame::Array(items)) = self.stack.pop() {
                    self.complete(Value::Array(items))
                } else {
                    false
                }
            }
            Event::String(value) => self.complete(Value::String(value.clone())),
            Event::Bool(value) => self.complete(Value::Bool(*value)),
            Event::Null => self.complete(Value::Null),
            Event::Number(number) => {
                let value = Value::Number(number.value().clone());
                self.complete(value)
            }
        }
    }

    fn complete(&mut self, value: Value) -> bool {
        match self.stack.last_mut() {
            Some(Frame::Array(items)) => {
                items.push(value);
                false
            }
            Some(Frame::Object(map, pending)) => {
                if let Some(key) = pending.take() {
                    map.insert(key, value);
                }
                false
            }
            None => {
                self.result = Some(value);
                true
            }
        }
    }

    /// The finished value; `None` until `feed` has returned `true`.
    pub(crate) fn take(&mut self) -> Option<Value> {
        self.result.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventSource, SyntaxError};
    use crate::tokenizer::Tokenizer;
    use serde_json::json;

    fn rebuild(text: &str) -> Value {
        let mut tokenizer = Tokenizer::new(text);
        let mut builder = ValueBuilder::new();
        while let Some(result) = tokenizer.next_event() {
            let ev: Result<_, SyntaxError> = result;
            if builder.feed(&ev.expect("valid JSON").event) {
                break;
            }
        }
        builder.take().expect("complete value")
    }

    #[test]
    fn rebuilds_nested_values() {
        let value = rebuild(r#"{"a": [1, 2.5, {"b": null}], "c": "x"}"#);
        assert_eq!(value, json!({"a": [1, 2.5, {"b": null}], "c": "x"}));
    }

    #[test]
    fn numeric_equality() {
        assert!(equal(&json!(1), &json!(1.0)));
        assert!(equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
        assert!(!equal(&json!(1), &json!(2)));
        assert!(!equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}
