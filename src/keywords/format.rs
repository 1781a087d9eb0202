//! Validator for the `format` keyword.
//!
//! Known attributes assert; unknown ones are inert annotations unless the
//! compiler runs in strict mode, where they are build errors.
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Assertion, AssertionEval, Eval};
use crate::events::{Event, Location};
use crate::format::FormatFn;
use crate::instance_type::InstanceType;
use crate::problem::Problem;
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

#[derive(Debug)]
pub(crate) struct FormatKeyword {
    attribute: String,
    matcher: Option<FormatFn>,
}

impl FormatKeyword {
    pub(crate) fn new(attribute: &str, matcher: Option<FormatFn>) -> FormatKeyword {
        FormatKeyword {
            attribute: attribute.to_string(),
            matcher,
        }
    }
}

#[derive(Clone)]
struct FormatAssertion {
    attribute: String,
    matcher: FormatFn,
}

impl Assertion for FormatAssertion {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::String(value) => (self.matcher)(value),
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("format", "instance.problem.format", location)
            .param("attribute", self.attribute.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("format", "instance.problem.not.format", location)
            .param("attribute", self.attribute.clone())
    }
}

impl Keyword for FormatKeyword {
    fn name(&self) -> &str {
        "format"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        self.matcher.is_some() && ty == InstanceType::String
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("format".to_string(), Value::String(self.attribute.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        let matcher = self.matcher?;
        if ty != InstanceType::String {
            return None;
        }
        Some(AssertionEval::boxed(
            FormatAssertion {
                attribute: self.attribute.clone(),
                matcher,
            },
            affirmative,
        ))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match schema {
        Value::String(attribute) => {
            let matcher = context.options.formats.get(attribute);
            if matcher.is_none() && context.options.strict_formats {
                return fail(BuildError::UnknownFormat {
                    format: attribute.clone(),
                });
            }
            ok(FormatKeyword::new(attribute, matcher))
        }
        _ => fail(BuildError::WrongType {
            keyword: "format",
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::{check, run_schema};
    use crate::eval::Verdict;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"format": "email"}), "\"a@b.c\"", true)]
    #[test_case(json!({"format": "email"}), "\"not-an-email\"", false)]
    #[test_case(json!({"format": "email"}), "5", true; "non-strings pass")]
    #[test_case(json!({"format": "ipv4"}), "\"127.0.0.1\"", true)]
    #[test_case(json!({"format": "zzz"}), "\"anything\"", true; "unknown formats are inert")]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, _) = check(&schema, instance);
        assert_eq!(valid, expected);
    }

    #[test]
    fn strict_mode_rejects_unknown_formats() {
        let result = Schema::options()
            .strict_formats(true)
            .compile(&json!({"format": "zzz"}));
        assert!(result.is_err());
        let result = Schema::options()
            .strict_formats(true)
            .compile(&json!({"format": "email"}));
        assert!(result.is_ok());
    }

    #[test]
    fn custom_attributes() {
        let schema = Schema::options()
            .format("even-length", |s| s.chars().count() % 2 == 0)
            .compile(&json!({"format": "even-length"}))
            .unwrap();
        let (verdict, _) = run_schema(&schema, true, "\"ab\"");
        assert_eq!(verdict, Verdict::True);
        let (verdict, _) = run_schema(&schema, true, "\"abc\"");
        assert_eq!(verdict, Verdict::False);
    }
}
