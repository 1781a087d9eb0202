//! The compiled schema object model.
//!
//! A schema is either a boolean, an object carrying an ordered keyword set,
//! or a reference with a late-bound target slot. The graph is immutable after
//! `compile` returns and may be shared across evaluations by reference.
use crate::error::BuildError;
use crate::eval::{AlwaysFalse, AlwaysTrue, Eval};
use crate::eval::combine::{Conjunction, Disjunction};
use crate::format::FormatRegistry;
use crate::instance_type::InstanceType;
use crate::keywords::{self, Keyword};
use crate::reader;
use crate::resolver::RefRegistry;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Weak};
use url::Url;

pub(crate) const DOCUMENT_PROTOCOL: &str = "json-schema:///";

/// Supported specification drafts. The compiler is parameterised on the
/// draft, although only Draft-07 keyword semantics are implemented.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Draft {
    Draft7,
}

type CompileFunc = fn(
    &Map<String, Value>,
    &Value,
    &mut reader::ReaderContext<'_>,
) -> Option<Result<Arc<dyn Keyword>, BuildError>>;

impl Draft {
    pub(crate) fn get_keyword(self, keyword: &str) -> Option<CompileFunc> {
        match self {
            Draft::Draft7 => match keyword {
                "additionalItems" => Some(keywords::additional_items::compile),
                "additionalProperties" => Some(keywords::additional_properties::compile),
                "allOf" => Some(keywords::all_of::compile),
                "anyOf" => Some(keywords::any_of::compile),
                "const" => Some(keywords::const_::compile),
                "contains" => Some(keywords::contains::compile),
                "contentMediaType" => Some(keywords::content::compile_media_type),
                "contentEncoding" => Some(keywords::content::compile_content_encoding),
                "definitions" => Some(keywords::definitions::compile),
                "dependencies" => Some(keywords::dependencies::compile),
                "enum" => Some(keywords::enum_::compile),
                "exclusiveMaximum" => Some(keywords::exclusive_maximum::compile),
                "exclusiveMinimum" => Some(keywords::exclusive_minimum::compile),
                "format" => Some(keywords::format::compile),
                "if" => Some(keywords::if_::compile),
                "items" => Some(keywords::items::compile),
                "maxContains" => None,
                "maximum" => Some(keywords::maximum::compile),
                "maxItems" => Some(keywords::max_items::compile),
                "maxLength" => Some(keywords::max_length::compile),
                "maxProperties" => Some(keywords::max_properties::compile),
                "minContains" => None,
                "minimum" => Some(keywords::minimum::compile),
                "minItems" => Some(keywords::min_items::compile),
                "minLength" => Some(keywords::min_length::compile),
                "minProperties" => Some(keywords::min_properties::compile),
                "multipleOf" => Some(keywords::multiple_of::compile),
                "not" => Some(keywords::not::compile),
                "oneOf" => Some(keywords::one_of::compile),
                "pattern" => Some(keywords::pattern::compile),
                "patternProperties" => Some(keywords::pattern_properties::compile),
                "properties" => Some(keywords::properties::compile),
                "propertyNames" => Some(keywords::property_names::compile),
                "required" => Some(keywords::required::compile),
                "type" => Some(keywords::type_::compile),
                "uniqueItems" => Some(keywords::unique_items::compile),
                _ => None,
            },
        }
    }
}

/// Get the `Draft` from a JSON Schema URL.
pub fn draft_from_url(url: &str) -> Option<Draft> {
    match url {
        "http://json-schema.org/draft-07/schema#" => Some(Draft::Draft7),
        _ => None,
    }
}

/// Get the `Draft` from the `$schema` field of a schema document.
pub fn draft_from_schema(schema: &Value) -> Option<Draft> {
    schema
        .as_object()
        .and_then(|x| x.get("$schema"))
        .and_then(Value::as_str)
        .and_then(draft_from_url)
}

pub(crate) fn id_of(schema: &Value) -> Option<&str> {
    if let Value::Object(object) = schema {
        object.get("$id").and_then(Value::as_str)
    } else {
        None
    }
}

/// Compilation options: draft selection, format strictness and custom
/// format attributes.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub(crate) draft: Draft,
    pub(crate) strict_formats: bool,
    pub(crate) formats: FormatRegistry,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions {
            draft: Draft::Draft7,
            strict_formats: false,
            formats: FormatRegistry::default(),
        }
    }
}

impl CompileOptions {
    pub fn draft(mut self, draft: Draft) -> CompileOptions {
        self.draft = draft;
        self
    }

    /// In strict mode an unknown `format` is a build error instead of an
    /// inert annotation.
    pub fn strict_formats(mut self, strict: bool) -> CompileOptions {
        self.strict_formats = strict;
        self
    }

    /// Register a custom format attribute.
    pub fn format(mut self, name: &str, attribute: fn(&str) -> bool) -> CompileOptions {
        self.formats.register(name, attribute);
        self
    }

    /// Compile `schema` into a linked schema graph.
    pub fn compile(&self, schema: &Value) -> Result<Arc<Schema>, BuildError> {
        let draft = draft_from_schema(schema).unwrap_or(self.draft);
        let scope = match id_of(schema) {
            Some(id) => Url::parse(id).map_err(|_| BuildError::InvalidUri {
                reference: id.to_string(),
            })?,
            None => Url::parse(DOCUMENT_PROTOCOL).expect("the default scope is a valid URL"),
        };
        let mut registry = RefRegistry::new();
        let root = {
            let mut context = reader::ReaderContext::new(scope, draft, self, &mut registry);
            reader::read_schema(schema, &mut context)?
        };
        registry.resolve_all();
        Ok(root)
    }
}

/// A compiled JSON schema.
pub struct Schema {
    pub(crate) kind: SchemaKind,
}

pub(crate) enum SchemaKind {
    Boolean(bool),
    Object(ObjectSchema),
    Ref(RefSchema),
}

pub(crate) struct ObjectSchema {
    pub(crate) id: Option<Url>,
    pub(crate) keywords: Vec<Arc<dyn Keyword>>,
}

/// An unresolved or resolved `$ref`. The target slot is populated by the
/// resolver after the whole document has been read, which is what makes
/// cyclic schemas work: dereferencing happens lazily per `evaluator` call.
pub(crate) struct RefSchema {
    /// The reference as written in the document.
    pub(crate) source: String,
    /// The reference resolved against its base URI.
    pub(crate) reference: Url,
    pub(crate) target: RwLock<Option<Weak<Schema>>>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SchemaKind::Boolean(value) => write!(f, "Schema({})", value),
            SchemaKind::Object(object) => {
                let names: Vec<_> = object.keywords.iter().map(|k| k.name()).collect();
                write!(f, "Schema{{{}}}", names.join(", "))
            }
            SchemaKind::Ref(reference) => write!(f, "Schema($ref: {})", reference.reference),
        }
    }
}

impl Schema {
    /// Compile with default options; the draft is detected from `$schema`.
    pub fn compile(schema: &Value) -> Result<Arc<Schema>, BuildError> {
        CompileOptions::default().compile(schema)
    }

    /// Start configuring compilation.
    pub fn options() -> CompileOptions {
        CompileOptions::default()
    }

    /// The `$id` of the schema, when present.
    pub fn id(&self) -> Option<&Url> {
        match &self.kind {
            SchemaKind::Object(object) => object.id.as_ref(),
            _ => None,
        }
    }

    /// Serialize the compiled schema back into a JSON document. Keyword
    /// order is the insertion order of the source, which keeps the output
    /// deterministic; references serialize as written.
    pub fn to_json(&self) -> Value {
        match &self.kind {
            SchemaKind::Boolean(value) => Value::Bool(*value),
            SchemaKind::Ref(reference) => {
                let mut map = Map::new();
                map.insert("$ref".to_string(), Value::String(reference.source.clone()));
                Value::Object(map)
            }
            SchemaKind::Object(object) => {
                let mut map = Map::new();
                if let Some(id) = &object.id {
                    map.insert("$id".to_string(), Value::String(id.to_string()));
                }
                for keyword in &object.keywords {
                    keyword.serialize(&mut map);
                }
                Value::Object(map)
            }
        }
    }

    pub(crate) fn boolean(value: bool) -> Arc<Schema> {
        Arc::new(Schema {
            kind: SchemaKind::Boolean(value),
        })
    }

    /// Whether this schema accepts every instance, used for compile-time
    /// combinator simplification.
    pub(crate) fn is_always_true(&self) -> bool {
        match &self.kind {
            SchemaKind::Boolean(value) => *value,
            SchemaKind::Object(object) => object.keywords.is_empty(),
            SchemaKind::Ref(_) => false,
        }
    }

    pub(crate) fn is_always_false(&self) -> bool {
        matches!(self.kind, SchemaKind::Boolean(false))
    }

    const ALL_TYPES: [InstanceType; 7] = [
        InstanceType::Array,
        InstanceType::Boolean,
        InstanceType::Integer,
        InstanceType::Null,
        InstanceType::Number,
        InstanceType::Object,
        InstanceType::String,
    ];

    /// Whether any keyword of this schema constrains instances of `ty`.
    /// Schemas without assertions constrain nothing and accept everything.
    pub(crate) fn applicable(&self, ty: InstanceType) -> bool {
        match &self.kind {
            SchemaKind::Boolean(_) => true,
            SchemaKind::Object(object) => {
                let mut any_active = false;
                for keyword in &object.keywords {
                    if keyword.applies_to(ty) {
                        return true;
                    }
                    any_active |= Schema::ALL_TYPES.iter().any(|t| keyword.applies_to(*t));
                }
                !any_active
            }
            SchemaKind::Ref(reference) => match crate::resolver::deref(&reference.target) {
                Some(target) => target.applicable(ty),
                None => true,
            },
        }
    }

    /// The instance types this schema's keywords constrain, for reporting
    /// why an inapplicable `oneOf` branch cannot match. `integer` folds into
    /// `number`.
    pub(crate) fn constrained_types(&self) -> Vec<InstanceType> {
        let mut types: Vec<InstanceType> = Schema::ALL_TYPES
            .iter()
            .copied()
            .filter(|ty| self.applicable(*ty))
            .collect();
        if types.contains(&InstanceType::Number) {
            types.retain(|ty| *ty != InstanceType::Integer);
        }
        types
    }

    /// Build the evaluator of this schema for an instance of type `ty`.
    ///
    /// The affirmative evaluator is the conjunction of the keyword
    /// evaluators; the negated one is the disjunction of their negations.
    pub(crate) fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Eval {
        match &self.kind {
            SchemaKind::Boolean(true) => {
                if affirmative {
                    Box::new(AlwaysTrue)
                } else {
                    Box::new(AlwaysFalse::new("not", "instance.problem.not.schema"))
                }
            }
            SchemaKind::Boolean(false) => {
                if affirmative {
                    Box::new(AlwaysFalse::new("schema", "instance.problem.unacceptable"))
                } else {
                    Box::new(AlwaysTrue)
                }
            }
            SchemaKind::Object(object) => {
                // A keyword that rejects the whole type makes its siblings
                // moot; the conjunction collapses to that single failure.
                if let Some(keyword) = object.keywords.iter().find(|k| k.rejects_type(ty)) {
                    return if affirmative {
                        keyword
                            .evaluator(ty, true)
                            .unwrap_or_else(|| Box::new(AlwaysTrue))
                    } else {
                        Box::new(AlwaysTrue)
                    };
                }
                let mut children: Vec<Eval> = Vec::with_capacity(object.keywords.len());
                for keyword in &object.keywords {
                    if let Some(eval) = keyword.evaluator(ty, affirmative) {
                        children.push(eval);
                    }
                }
                match (children.len(), affirmative) {
                    (0, true) => Box::new(AlwaysTrue),
                    (0, false) => {
                        Box::new(AlwaysFalse::new("not", "instance.problem.not.schema"))
                    }
                    (1, _) => children.pop().expect("one child is present"),
                    (_, true) => Conjunction::boxed(children),
                    (_, false) => {
                        Disjunction::boxed(children, "not", "instance.problem.not.schema", false)
                    }
                }
            }
            SchemaKind::Ref(reference) => {
                match crate::resolver::deref(&reference.target) {
                    Some(schema) => schema.evaluator(ty, affirmative),
                    None => Box::new(
                        AlwaysFalse::new("$ref", "instance.problem.ref")
                            .param("uri", reference.reference.as_str()),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"$schema": "http://json-schema.org/draft-07/schema#"}), Some(Draft::Draft7))]
    #[test_case(json!({"$schema": "http://example.com/custom/schema#"}), None)]
    fn test_draft_from_schema(schema: Value, draft: Option<Draft>) {
        assert_eq!(draft_from_schema(&schema), draft)
    }

    #[test]
    fn boolean_schemas() {
        let schema = Schema::compile(&json!(true)).unwrap();
        assert!(schema.is_always_true());
        let schema = Schema::compile(&json!(false)).unwrap();
        assert!(schema.is_always_false());
    }

    #[test]
    fn serialization_round_trips() {
        let document = json!({
            "type": "object",
            "properties": {"a": {"type": "integer", "minimum": 0}},
            "required": ["a"],
            "additionalProperties": false,
            "definitions": {"b": {"$ref": "#/properties/a"}}
        });
        let schema = Schema::compile(&document).unwrap();
        assert_eq!(schema.to_json(), document);
        let recompiled = Schema::compile(&schema.to_json()).unwrap();
        assert_eq!(recompiled.to_json(), document);
    }

    #[test]
    fn keyword_order_is_preserved() {
        let schema = Schema::compile(&json!({"minimum": 0, "maximum": 10, "type": "integer"}))
            .unwrap();
        if let SchemaKind::Object(object) = &schema.kind {
            let names: Vec<_> = object.keywords.iter().map(|k| k.name()).collect();
            assert_eq!(names, vec!["minimum", "maximum", "type"]);
        } else {
            panic!("expected an object schema");
        }
    }
}
