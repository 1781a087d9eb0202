//! Validator for the `type` keyword.
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{AlwaysFalse, AlwaysTrue, Eval};
use crate::instance_type::InstanceType;
use crate::reader::ReaderContext;
use serde_json::{Map, Value};
use std::convert::TryFrom;

#[derive(Debug)]
pub(crate) struct Type {
    types: Vec<InstanceType>,
}

impl Type {
    pub(crate) fn new(types: Vec<InstanceType>) -> Result<Type, BuildError> {
        if types.is_empty() {
            return Err(BuildError::EmptyArray { keyword: "type" });
        }
        let mut seen = Vec::new();
        for ty in &types {
            if seen.contains(ty) {
                return Err(BuildError::DuplicateEntry { keyword: "type" });
            }
            seen.push(*ty);
        }
        Ok(Type { types })
    }

    fn accepts(&self, ty: InstanceType) -> bool {
        self.types.iter().any(|required| ty.is(*required))
    }

    fn expected(&self) -> Value {
        if self.types.len() == 1 {
            Value::String(self.types[0].to_string())
        } else {
            Value::Array(
                self.types
                    .iter()
                    .map(|ty| Value::String(ty.to_string()))
                    .collect(),
            )
        }
    }
}

impl Keyword for Type {
    fn name(&self) -> &str {
        "type"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        true
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("type".to_string(), self.expected());
    }

    fn rejects_type(&self, ty: InstanceType) -> bool {
        !self.accepts(ty)
    }

    /// The instance type is known at evaluator construction, so the verdict
    /// reduces to an always-true or always-false evaluator.
    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if self.accepts(ty) == affirmative {
            Some(Box::new(AlwaysTrue))
        } else if affirmative {
            Some(Box::new(
                AlwaysFalse::new("type", "instance.problem.type")
                    .param("expected", self.expected())
                    .param("actual", ty.to_string()),
            ))
        } else {
            Some(Box::new(
                AlwaysFalse::new("type", "instance.problem.not.type")
                    .param("expected", self.expected()),
            ))
        }
    }
}

fn parse_type(value: &Value) -> Result<InstanceType, BuildError> {
    match value {
        Value::String(name) => {
            InstanceType::try_from(name.as_str()).map_err(|_| BuildError::UnknownType {
                name: name.clone(),
            })
        }
        _ => Err(BuildError::WrongType {
            keyword: "type",
            expected: "a string or an array of strings",
        }),
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    let types = match schema {
        Value::Array(items) => items.iter().map(parse_type).collect(),
        single => parse_type(single).map(|ty| vec![ty]),
    };
    match types.and_then(Type::new) {
        Ok(keyword) => ok(keyword),
        Err(error) => fail(error),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::{check, run_schema};
    use crate::eval::Verdict;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"type": "integer"}), "42", true)]
    #[test_case(json!({"type": "integer"}), "42.0", true; "one point zero is integral")]
    #[test_case(json!({"type": "integer"}), "100.5", false)]
    #[test_case(json!({"type": "number"}), "42", true; "integers are numbers")]
    #[test_case(json!({"type": ["string", "null"]}), "null", true)]
    #[test_case(json!({"type": ["string", "null"]}), "[]", false)]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(Schema::compile(&json!({"type": "float"})).is_err());
        assert!(Schema::compile(&json!({"type": []})).is_err());
        assert!(Schema::compile(&json!({"type": ["integer", "integer"]})).is_err());
    }

    #[test]
    fn negated() {
        let schema = Schema::compile(&json!({"type": "integer"})).unwrap();
        let (verdict, problems) = run_schema(&schema, false, "42");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems[0].message_key(), "instance.problem.not.type");
    }
}
