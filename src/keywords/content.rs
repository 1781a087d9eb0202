//! Validators for the `contentMediaType` and `contentEncoding` keywords.
//!
//! Built-in: `base64` decoding and the `application/json` matcher. Unknown
//! encodings and media types degrade to inert annotations; when both
//! keywords are present and known, a combined validator decodes first and
//! tests the decoded bytes.
use super::annotations::Annotation;
use super::{fail, ok, CompileResult, Keyword, KeywordRef};
use crate::error::BuildError;
use crate::eval::{Assertion, AssertionEval, Eval};
use crate::events::{Event, Location};
use crate::instance_type::InstanceType;
use crate::problem::Problem;
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

fn known_media_type(media_type: &str) -> bool {
    media_type.eq_ignore_ascii_case("application/json")
}

fn known_encoding(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("base64")
}

fn is_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

#[derive(Debug, Clone)]
pub(crate) struct ContentEncoding {
    encoding: String,
}

impl Assertion for ContentEncoding {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::String(value) => base64::decode(value).is_ok(),
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("contentEncoding", "instance.problem.contentEncoding", location)
            .param("encoding", self.encoding.clone())
    }

    fn negated_problem(&self, event: &Event, location: Location) -> Problem {
        self.problem(event, location)
    }
}

impl Keyword for ContentEncoding {
    fn name(&self) -> &str {
        "contentEncoding"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("contentEncoding".to_string(), Value::String(self.encoding.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::String {
            return None;
        }
        Some(AssertionEval::boxed(self.clone(), affirmative))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ContentMediaType {
    media_type: String,
}

impl Assertion for ContentMediaType {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::String(value) => is_json(value),
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("contentMediaType", "instance.problem.contentMediaType", location)
            .param("type", self.media_type.clone())
    }

    fn negated_problem(&self, event: &Event, location: Location) -> Problem {
        self.problem(event, location)
    }
}

impl Keyword for ContentMediaType {
    fn name(&self) -> &str {
        "contentMediaType"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("contentMediaType".to_string(), Value::String(self.media_type.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::String {
            return None;
        }
        Some(AssertionEval::boxed(self.clone(), affirmative))
    }
}

/// Decode, then test the media type. A string that does not decode leaves
/// nothing to test and passes.
#[derive(Debug, Clone)]
pub(crate) struct ContentMediaTypeAndEncoding {
    media_type: String,
    encoding: String,
}

impl Assertion for ContentMediaTypeAndEncoding {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::String(value) => match base64::decode(value) {
                Ok(decoded) => match String::from_utf8(decoded) {
                    Ok(text) => is_json(&text),
                    Err(_) => false,
                },
                Err(_) => true,
            },
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("contentMediaType", "instance.problem.contentMediaType", location)
            .param("type", self.media_type.clone())
            .param("encoding", self.encoding.clone())
    }

    fn negated_problem(&self, event: &Event, location: Location) -> Problem {
        self.problem(event, location)
    }
}

impl Keyword for ContentMediaTypeAndEncoding {
    fn name(&self) -> &str {
        "contentMediaType"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("contentMediaType".to_string(), Value::String(self.media_type.clone()));
        map.insert("contentEncoding".to_string(), Value::String(self.encoding.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty != InstanceType::String {
            return None;
        }
        Some(AssertionEval::boxed(self.clone(), affirmative))
    }
}

/// Resolve the media-type/encoding pair into concrete keywords, used by the
/// programmatic builder.
pub(crate) fn assemble(media_type: Option<&str>, encoding: Option<&str>) -> Vec<KeywordRef> {
    let mut keywords: Vec<KeywordRef> = Vec::new();
    match (media_type, encoding) {
        (Some(media), Some(enc)) if known_media_type(media) && known_encoding(enc) => {
            keywords.push(std::sync::Arc::new(ContentMediaTypeAndEncoding {
                media_type: media.to_string(),
                encoding: enc.to_string(),
            }));
        }
        (media, enc) => {
            if let Some(media) = media {
                if known_media_type(media) && enc.is_none() {
                    keywords.push(std::sync::Arc::new(ContentMediaType {
                        media_type: media.to_string(),
                    }));
                } else {
                    keywords.push(Annotation::new(
                        "contentMediaType",
                        Value::String(media.to_string()),
                    ));
                }
            }
            if let Some(enc) = enc {
                if known_encoding(enc) {
                    keywords.push(std::sync::Arc::new(ContentEncoding {
                        encoding: enc.to_string(),
                    }));
                } else {
                    keywords.push(Annotation::new(
                        "contentEncoding",
                        Value::String(enc.to_string()),
                    ));
                }
            }
        }
    }
    keywords
}

#[inline]
pub(crate) fn compile_media_type(
    parent: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    let media_type = match schema {
        Value::String(media_type) => media_type,
        _ => {
            return fail(BuildError::WrongType {
                keyword: "contentMediaType",
                expected: "a string",
            })
        }
    };
    let encoding = parent.get("contentEncoding").and_then(Value::as_str);
    if !known_media_type(media_type) {
        return Some(Ok(Annotation::new("contentMediaType", schema.clone())));
    }
    match encoding {
        Some(encoding) if known_encoding(encoding) => ok(ContentMediaTypeAndEncoding {
            media_type: media_type.clone(),
            encoding: encoding.to_string(),
        }),
        Some(_) => {
            // Encoded in a way we cannot decode; nothing to test.
            Some(Ok(Annotation::new("contentMediaType", schema.clone())))
        }
        None => ok(ContentMediaType {
            media_type: media_type.clone(),
        }),
    }
}

#[inline]
pub(crate) fn compile_content_encoding(
    parent: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    let encoding = match schema {
        Value::String(encoding) => encoding,
        _ => {
            return fail(BuildError::WrongType {
                keyword: "contentEncoding",
                expected: "a string",
            })
        }
    };
    if !known_encoding(encoding) {
        return Some(Ok(Annotation::new("contentEncoding", schema.clone())));
    }
    // When a known media type is present the combined validator, compiled
    // with `contentMediaType`, already decodes.
    match parent.get("contentMediaType").and_then(Value::as_str) {
        Some(media_type) if known_media_type(media_type) => None,
        _ => ok(ContentEncoding {
            encoding: encoding.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("\"eyJhIjogMX0=\"", true)]
    #[test_case("\"not base64!\"", false)]
    fn encoding_alone(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"contentEncoding": "base64"}), instance);
        assert_eq!(valid, expected);
    }

    #[test_case("\"{\\\"a\\\": 1}\"", true)]
    #[test_case("\"{oops\"", false)]
    fn media_type_alone(instance: &str, expected: bool) {
        let (valid, _) = check(&json!({"contentMediaType": "application/json"}), instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn combined_decodes_first() {
        let schema = json!({
            "contentMediaType": "application/json",
            "contentEncoding": "base64"
        });
        // base64 for `{"a": 1}`
        let (valid, _) = check(&schema, "\"eyJhIjogMX0=\"");
        assert!(valid);
        // base64 for `{oops`
        let (valid, problems) = check(&schema, "\"e29vcHM=\"");
        assert!(!valid);
        assert_eq!(problems[0].parameters()[0], ("type", json!("application/json")));
        // Not decodable at all: nothing to test.
        let (valid, _) = check(&schema, "\"not base64!\"");
        assert!(valid);
    }

    #[test]
    fn unknown_values_are_inert() {
        let (valid, _) = check(&json!({"contentEncoding": "rot13"}), "\"anything\"");
        assert!(valid);
        let (valid, _) = check(&json!({"contentMediaType": "image/png"}), "\"anything\"");
        assert!(valid);
    }
}
