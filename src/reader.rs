//! Walks a parsed JSON schema document and drives the schema builder.
//!
//! The reader also performs the first resolution pass: every subschema is
//! registered in the reference registry under its canonical addresses, both
//! relative to the nearest enclosing `$id` and relative to the document
//! root, and every `$ref` site is collected for the linking pass.
use crate::builder::SchemaBuilder;
use crate::error::BuildError;
use crate::keywords::annotations::Annotation;
use crate::resolver::RefRegistry;
use crate::schemas::{self, CompileOptions, Draft, RefSchema, Schema, SchemaKind};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

const ANNOTATIONS: &[&str] = &[
    "$schema",
    "title",
    "description",
    "default",
    "examples",
    "$comment",
    "readOnly",
    "writeOnly",
];

pub(crate) struct ReaderContext<'a> {
    scope: Url,
    scope_pointer: String,
    root: Url,
    root_pointer: String,
    draft: Draft,
    pub(crate) options: &'a CompileOptions,
    registry: &'a mut RefRegistry,
}

impl<'a> ReaderContext<'a> {
    pub(crate) fn new(
        scope: Url,
        draft: Draft,
        options: &'a CompileOptions,
        registry: &'a mut RefRegistry,
    ) -> ReaderContext<'a> {
        ReaderContext {
            root: scope.clone(),
            scope,
            scope_pointer: String::new(),
            root_pointer: String::new(),
            draft,
            options,
            registry,
        }
    }

    /// Compile the subschema at `segments` below the current location.
    pub(crate) fn subschema(
        &mut self,
        value: &Value,
        segments: &[&str],
    ) -> Result<Arc<Schema>, BuildError> {
        let scope_len = self.scope_pointer.len();
        let root_len = self.root_pointer.len();
        for segment in segments {
            let escaped = segment.replace('~', "~0").replace('/', "~1");
            self.scope_pointer.push('/');
            self.scope_pointer.push_str(&escaped);
            self.root_pointer.push('/');
            self.root_pointer.push_str(&escaped);
        }
        let result = read_schema(value, self);
        self.scope_pointer.truncate(scope_len);
        self.root_pointer.truncate(root_len);
        result
    }

    /// Absolute URL of `reference`, resolved against the current scope
    /// per RFC 3986 §5.
    pub(crate) fn build_url(&self, reference: &str) -> Result<Url, BuildError> {
        Url::options()
            .base_url(Some(&self.scope))
            .parse(reference)
            .map_err(|_| BuildError::InvalidUri {
                reference: reference.to_string(),
            })
    }

    fn register(&mut self, schema: &Arc<Schema>) {
        let scoped = fragment_url(&self.scope, &self.scope_pointer);
        self.registry.register(&scoped, schema);
        let rooted = fragment_url(&self.root, &self.root_pointer);
        self.registry.register(&rooted, schema);
    }
}

fn fragment_url(base: &Url, pointer: &str) -> Url {
    let mut url = base.clone();
    if pointer.is_empty() {
        // Keep any plain-name fragment the base may carry.
        if url.fragment().map_or(false, str::is_empty) {
            url.set_fragment(None);
        }
    } else {
        url.set_fragment(Some(pointer));
    }
    url
}

/// Compile one schema node. Booleans and `$ref` objects short-circuit;
/// everything else flows through the builder keyword by keyword.
pub(crate) fn read_schema(
    value: &Value,
    context: &mut ReaderContext<'_>,
) -> Result<Arc<Schema>, BuildError> {
    match value {
        Value::Bool(boolean) => {
            let schema = Schema::boolean(*boolean);
            context.register(&schema);
            Ok(schema)
        }
        Value::Object(object) => {
            if let Some(reference) = object.get("$ref") {
                // Draft-07: `$ref` makes every sibling keyword inert.
                let source = reference.as_str().ok_or(BuildError::WrongType {
                    keyword: "$ref",
                    expected: "a string",
                })?;
                let reference = context.build_url(source)?;
                let schema = Arc::new(Schema {
                    kind: SchemaKind::Ref(RefSchema {
                        source: source.to_string(),
                        reference,
                        target: RwLock::new(None),
                    }),
                });
                context.register(&schema);
                context.registry.register_ref(&schema);
                return Ok(schema);
            }

            let saved_scope = match schemas::id_of(value) {
                Some(id) => {
                    let new_scope = context.build_url(id)?;
                    let saved = (
                        std::mem::replace(&mut context.scope, new_scope),
                        std::mem::take(&mut context.scope_pointer),
                    );
                    Some(saved)
                }
                None => None,
            };

            let mut builder = SchemaBuilder::with_options(context.options.clone());
            for (keyword, subvalue) in object {
                if let Some(compile) = context.draft.get_keyword(keyword) {
                    if let Some(result) = compile(object, subvalue, context) {
                        builder = builder.keyword(result?)?;
                    }
                } else if ANNOTATIONS.contains(&keyword.as_str()) {
                    builder = builder.keyword(Annotation::new(keyword, subvalue.clone()))?;
                }
                // Unknown keywords are ignored, as the draft requires.
            }

            let id = saved_scope.as_ref().map(|_| context.scope.clone());
            let schema = builder.finish_object(id)?;
            context.register(&schema);

            if let Some((scope, pointer)) = saved_scope {
                context.scope = scope;
                context.scope_pointer = pointer;
            }
            Ok(schema)
        }
        _ => Err(BuildError::NotASchema),
    }
}
