//! Annotation keywords: metadata only, never evaluated.
use super::{Keyword, KeywordRef};
use crate::eval::Eval;
use crate::instance_type::InstanceType;
use serde_json::{Map, Value};
use std::sync::Arc;

/// `title`, `description`, `default` and friends. Carried in the keyword set
/// so that order and content survive compilation, but inert for validation;
/// negation is therefore always-true, expressed as "contributes nothing".
#[derive(Debug)]
pub(crate) struct Annotation {
    name: String,
    value: Value,
}

impl Annotation {
    pub(crate) fn new(name: &str, value: Value) -> KeywordRef {
        Arc::new(Annotation {
            name: name.to_string(),
            value,
        })
    }

    pub(crate) fn plain(name: &str, value: Value) -> Annotation {
        Annotation {
            name: name.to_string(),
            value,
        }
    }
}

impl Keyword for Annotation {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies_to(&self, _: InstanceType) -> bool {
        false
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert(self.name.clone(), self.value.clone());
    }

    fn evaluator(&self, _: InstanceType, _: bool) -> Option<Eval> {
        None
    }
}
