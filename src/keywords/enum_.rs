//! Validator for the `enum` keyword.
use super::const_::DeepCompare;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::value::equal;
use crate::eval::Eval;
use crate::instance_type::InstanceType;
use crate::reader::ReaderContext;
use serde_json::{Map, Value};

#[derive(Debug)]
pub(crate) struct Enum {
    options: Vec<Value>,
}

impl Enum {
    pub(crate) fn new(options: Vec<Value>) -> Result<Enum, BuildError> {
        if options.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "enum" });
        }
        for (index, option) in options.iter().enumerate() {
            if options[..index].iter().any(|seen| equal(seen, option)) {
                return Err(BuildError::DuplicateEntry { keyword: "enum" });
            }
        }
        Ok(Enum { options })
    }
}

impl Keyword for Enum {
    fn name(&self) -> &str {
        "enum"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("enum".to_string(), Value::Array(self.options.clone()));
    }

    fn evaluator(&self, _: InstanceType, affirmative: bool) -> Option<Eval> {
        Some(DeepCompare::boxed(
            self.options.clone(),
            affirmative,
            "enum",
            "instance.problem.enum",
            "instance.problem.not.enum",
            Value::Array(self.options.clone()),
        ))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    match schema {
        Value::Array(options) => match Enum::new(options.clone()) {
            Ok(keyword) => ok(keyword),
            Err(error) => fail(error),
        },
        _ => fail(BuildError::WrongType {
            keyword: "enum",
            expected: "a non-empty array",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"enum": [1, "two", null]}), "\"two\"", true)]
    #[test_case(json!({"enum": [1, "two", null]}), "null", true)]
    #[test_case(json!({"enum": [1, "two", null]}), "1.0", true)]
    #[test_case(json!({"enum": [1, "two", null]}), "2", false)]
    #[test_case(json!({"enum": [[1, 2]]}), "[1, 2.0]", true)]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn rejects_bad_schemas() {
        assert!(Schema::compile(&json!({"enum": []})).is_err());
        assert!(Schema::compile(&json!({"enum": [1, 1.0]})).is_err());
        assert!(Schema::compile(&json!({"enum": 3})).is_err());
    }
}
