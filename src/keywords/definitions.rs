//! The `definitions` keyword: a named bag of schemas that plays no direct
//! role in validation but anchors `$ref` targets and keeps them alive.
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::Eval;
use crate::instance_type::InstanceType;
use crate::reader::ReaderContext;
use crate::schemas::Schema;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct Definitions {
    entries: Vec<(String, Arc<Schema>)>,
}

impl Definitions {
    pub(crate) fn new(entries: Vec<(String, Arc<Schema>)>) -> Definitions {
        Definitions { entries }
    }
}

impl Keyword for Definitions {
    fn name(&self) -> &str {
        "definitions"
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        false
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        let mut value = Map::new();
        for (name, schema) in &self.entries {
            value.insert(name.clone(), schema.to_json());
        }
        map.insert("definitions".to_string(), Value::Object(value));
    }

    fn evaluator(&self, _: InstanceType, _: bool) -> Option<Eval> {
        None
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &mut ReaderContext<'_>,
) -> CompileResult {
    match schema {
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (name, subschema) in map {
                match context.subschema(subschema, &["definitions", name]) {
                    Ok(compiled) => entries.push((name.clone(), compiled)),
                    Err(error) => return fail(error),
                }
            }
            ok(Definitions::new(entries))
        }
        _ => fail(BuildError::WrongType {
            keyword: "definitions",
            expected: "an object",
        }),
    }
}
