//! Programmatic construction of schemas.
//!
//! The builder mirrors every keyword with positive-validation checks and is
//! also what the JSON reader drives internally. Map-valued keywords
//! (`properties`, `patternProperties`, `dependencies`, `definitions`) and
//! sibling-coupled ones (`if`/`then`/`else`, tuple `items` with
//! `additionalItems`, `contains` bounds, the content pair) accumulate in the
//! builder and are emitted as single keywords at finalization.
use crate::error::BuildError;
use crate::instance_type::InstanceType;
use crate::keywords::{
    self, additional_items::AdditionalItems, additional_properties::AdditionalProperties,
    all_of::AllOf, annotations::Annotation, any_of::AnyOf, const_::Const, contains::Contains,
    definitions::Definitions, dependencies::Dependencies, dependencies::Dependency, enum_::Enum,
    exclusive_maximum::ExclusiveMaximum, exclusive_minimum::ExclusiveMinimum,
    format::FormatKeyword, if_::IfThenElse, items::Items, max_items::MaxItems,
    max_length::MaxLength, max_properties::MaxProperties, maximum::Maximum, min_items::MinItems,
    min_length::MinLength, min_properties::MinProperties, minimum::Minimum,
    multiple_of::MultipleOf, not::Not, one_of::OneOf, pattern::Pattern,
    pattern_properties::PatternProperties, properties::Properties,
    property_names::PropertyNames, required::Required, type_::Type, unique_items::UniqueItems,
    KeywordRef,
};
use crate::schemas::{CompileOptions, ObjectSchema, Schema, SchemaKind};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::Arc;
use url::Url;

#[derive(Debug)]
enum ItemsForm {
    Single(Arc<Schema>),
    Tuple(Vec<Arc<Schema>>),
}

/// One-shot builder for an object schema.
#[derive(Debug)]
pub struct SchemaBuilder {
    options: CompileOptions,
    keywords: Vec<KeywordRef>,
    properties: Vec<(String, Arc<Schema>)>,
    pattern_properties: Vec<(String, Regex, Arc<Schema>)>,
    additional_properties: Option<Arc<Schema>>,
    dependencies: Vec<(String, Dependency)>,
    definitions: Vec<(String, Arc<Schema>)>,
    items: Option<ItemsForm>,
    additional_items: Option<Arc<Schema>>,
    contains: Option<Arc<Schema>>,
    min_contains: Option<u64>,
    max_contains: Option<u64>,
    if_schema: Option<Arc<Schema>>,
    then_schema: Option<Arc<Schema>>,
    else_schema: Option<Arc<Schema>>,
    media_type: Option<String>,
    encoding: Option<String>,
}

impl Default for SchemaBuilder {
    fn default() -> SchemaBuilder {
        SchemaBuilder::with_options(CompileOptions::default())
    }
}

impl SchemaBuilder {
    pub fn new() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn with_options(options: CompileOptions) -> SchemaBuilder {
        SchemaBuilder {
            options,
            keywords: Vec::new(),
            properties: Vec::new(),
            pattern_properties: Vec::new(),
            additional_properties: None,
            dependencies: Vec::new(),
            definitions: Vec::new(),
            items: None,
            additional_items: None,
            contains: None,
            min_contains: None,
            max_contains: None,
            if_schema: None,
            then_schema: None,
            else_schema: None,
            media_type: None,
            encoding: None,
        }
    }

    /// Append an already-built keyword. At most one occurrence per name.
    pub(crate) fn keyword(mut self, keyword: KeywordRef) -> Result<SchemaBuilder, BuildError> {
        if self.keywords.iter().any(|k| k.name() == keyword.name()) {
            return Err(BuildError::DuplicateKeyword {
                keyword: keyword.name().to_string(),
            });
        }
        self.keywords.push(keyword);
        Ok(self)
    }

    fn push(mut self, keyword: impl keywords::Keyword + 'static) -> Result<SchemaBuilder, BuildError> {
        let keyword: KeywordRef = Arc::new(keyword);
        self = self.keyword(keyword)?;
        Ok(self)
    }

    pub fn type_(self, ty: InstanceType) -> Result<SchemaBuilder, BuildError> {
        self.types(&[ty])
    }

    pub fn types(self, types: &[InstanceType]) -> Result<SchemaBuilder, BuildError> {
        self.push(Type::new(types.to_vec())?)
    }

    pub fn const_(self, value: Value) -> Result<SchemaBuilder, BuildError> {
        self.push(Const::new(value))
    }

    pub fn enum_(self, values: Vec<Value>) -> Result<SchemaBuilder, BuildError> {
        self.push(Enum::new(values)?)
    }

    pub fn multiple_of(self, factor: Number) -> Result<SchemaBuilder, BuildError> {
        self.push(MultipleOf::new(factor)?)
    }

    pub fn maximum(self, bound: Number) -> Result<SchemaBuilder, BuildError> {
        self.push(Maximum::new(bound))
    }

    pub fn minimum(self, bound: Number) -> Result<SchemaBuilder, BuildError> {
        self.push(Minimum::new(bound))
    }

    pub fn exclusive_maximum(self, bound: Number) -> Result<SchemaBuilder, BuildError> {
        self.push(ExclusiveMaximum::new(bound))
    }

    pub fn exclusive_minimum(self, bound: Number) -> Result<SchemaBuilder, BuildError> {
        self.push(ExclusiveMinimum::new(bound))
    }

    pub fn max_length(self, bound: u64) -> Result<SchemaBuilder, BuildError> {
        self.push(MaxLength::new(bound))
    }

    pub fn min_length(self, bound: u64) -> Result<SchemaBuilder, BuildError> {
        self.push(MinLength::new(bound))
    }

    pub fn pattern(self, pattern: &str) -> Result<SchemaBuilder, BuildError> {
        self.push(Pattern::new(pattern)?)
    }

    pub fn items(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.items = Some(ItemsForm::Single(schema));
        self
    }

    pub fn items_tuple(mut self, schemas: Vec<Arc<Schema>>) -> SchemaBuilder {
        self.items = Some(ItemsForm::Tuple(schemas));
        self
    }

    pub fn additional_items(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.additional_items = Some(schema);
        self
    }

    pub fn max_items(self, bound: u64) -> Result<SchemaBuilder, BuildError> {
        self.push(MaxItems::new(bound))
    }

    pub fn min_items(self, bound: u64) -> Result<SchemaBuilder, BuildError> {
        self.push(MinItems::new(bound))
    }

    pub fn unique_items(self, unique: bool) -> Result<SchemaBuilder, BuildError> {
        if unique {
            self.push(UniqueItems::new())
        } else {
            self.push(Annotation::plain("uniqueItems", Value::Bool(false)))
        }
    }

    pub fn contains(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.contains = Some(schema);
        self
    }

    pub fn min_contains(mut self, bound: u64) -> SchemaBuilder {
        self.min_contains = Some(bound);
        self
    }

    pub fn max_contains(mut self, bound: u64) -> SchemaBuilder {
        self.max_contains = Some(bound);
        self
    }

    pub fn max_properties(self, bound: u64) -> Result<SchemaBuilder, BuildError> {
        self.push(MaxProperties::new(bound))
    }

    pub fn min_properties(self, bound: u64) -> Result<SchemaBuilder, BuildError> {
        self.push(MinProperties::new(bound))
    }

    pub fn required(self, names: Vec<String>) -> Result<SchemaBuilder, BuildError> {
        self.push(Required::new(names)?)
    }

    pub fn property(mut self, name: &str, schema: Arc<Schema>) -> Result<SchemaBuilder, BuildError> {
        if self.properties.iter().any(|(n, _)| n == name) {
            return Err(BuildError::DuplicateEntry {
                keyword: "properties",
            });
        }
        self.properties.push((name.to_string(), schema));
        Ok(self)
    }

    pub fn pattern_property(
        mut self,
        pattern: &str,
        schema: Arc<Schema>,
    ) -> Result<SchemaBuilder, BuildError> {
        let regex = Regex::new(pattern)?;
        if self.pattern_properties.iter().any(|(p, _, _)| p == pattern) {
            return Err(BuildError::DuplicateEntry {
                keyword: "patternProperties",
            });
        }
        self.pattern_properties
            .push((pattern.to_string(), regex, schema));
        Ok(self)
    }

    pub fn additional_properties(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.additional_properties = Some(schema);
        self
    }

    pub fn property_names(self, schema: Arc<Schema>) -> Result<SchemaBuilder, BuildError> {
        self.push(PropertyNames::new(schema))
    }

    pub fn dependency_required(
        mut self,
        dependant: &str,
        names: Vec<String>,
    ) -> Result<SchemaBuilder, BuildError> {
        let dependency = Dependency::required(names)?;
        self.dependencies.push((dependant.to_string(), dependency));
        Ok(self)
    }

    pub fn dependency_schema(mut self, dependant: &str, schema: Arc<Schema>) -> SchemaBuilder {
        self.dependencies
            .push((dependant.to_string(), Dependency::Schema(schema)));
        self
    }

    pub fn definition(mut self, name: &str, schema: Arc<Schema>) -> SchemaBuilder {
        self.definitions.push((name.to_string(), schema));
        self
    }

    pub fn all_of(self, schemas: Vec<Arc<Schema>>) -> Result<SchemaBuilder, BuildError> {
        self.push(AllOf::new(schemas)?)
    }

    pub fn any_of(self, schemas: Vec<Arc<Schema>>) -> Result<SchemaBuilder, BuildError> {
        self.push(AnyOf::new(schemas)?)
    }

    pub fn one_of(self, schemas: Vec<Arc<Schema>>) -> Result<SchemaBuilder, BuildError> {
        self.push(OneOf::new(schemas)?)
    }

    pub fn not(self, schema: Arc<Schema>) -> Result<SchemaBuilder, BuildError> {
        self.push(Not::new(schema))
    }

    pub fn if_(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.if_schema = Some(schema);
        self
    }

    pub fn then(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.then_schema = Some(schema);
        self
    }

    pub fn else_(mut self, schema: Arc<Schema>) -> SchemaBuilder {
        self.else_schema = Some(schema);
        self
    }

    pub fn format(self, name: &str) -> Result<SchemaBuilder, BuildError> {
        let attribute = self.options.formats.get(name);
        if attribute.is_none() && self.options.strict_formats {
            return Err(BuildError::UnknownFormat {
                format: name.to_string(),
            });
        }
        self.push(FormatKeyword::new(name, attribute))
    }

    pub fn content_media_type(mut self, media_type: &str) -> SchemaBuilder {
        self.media_type = Some(media_type.to_string());
        self
    }

    pub fn content_encoding(mut self, encoding: &str) -> SchemaBuilder {
        self.encoding = Some(encoding.to_string());
        self
    }

    pub fn title(self, title: &str) -> Result<SchemaBuilder, BuildError> {
        self.push(Annotation::plain("title", Value::String(title.to_string())))
    }

    pub fn description(self, description: &str) -> Result<SchemaBuilder, BuildError> {
        self.push(Annotation::plain(
            "description",
            Value::String(description.to_string()),
        ))
    }

    pub fn default_value(self, value: Value) -> Result<SchemaBuilder, BuildError> {
        self.push(Annotation::plain("default", value))
    }

    /// Emit the deferred keywords and freeze the schema.
    pub fn build(self) -> Result<Arc<Schema>, BuildError> {
        self.finish_object(None)
    }

    pub(crate) fn finish_object(mut self, id: Option<Url>) -> Result<Arc<Schema>, BuildError> {
        if !self.definitions.is_empty() {
            let definitions = std::mem::take(&mut self.definitions);
            self = self.push(Definitions::new(definitions))?;
        }
        if !self.properties.is_empty() {
            let properties = self.properties.clone();
            self = self.push(Properties::new(properties))?;
        }
        if !self.pattern_properties.is_empty() {
            let entries = self.pattern_properties.clone();
            self = self.push(PatternProperties::new(entries))?;
        }
        if let Some(schema) = self.additional_properties.take() {
            let literals: Vec<String> =
                self.properties.iter().map(|(name, _)| name.clone()).collect();
            let patterns: Vec<Regex> = self
                .pattern_properties
                .iter()
                .map(|(_, regex, _)| regex.clone())
                .collect();
            self = self.push(AdditionalProperties::new(schema, literals, patterns))?;
        }
        match self.items.take() {
            Some(ItemsForm::Single(schema)) => {
                self = self.push(Items::single(schema))?;
            }
            Some(ItemsForm::Tuple(schemas)) => {
                let tuple_len = schemas.len();
                self = self.push(Items::tuple(schemas)?)?;
                if let Some(schema) = self.additional_items.take() {
                    self = self.push(AdditionalItems::new(schema, tuple_len))?;
                }
            }
            // `additionalItems` without a tuple `items` has nothing to apply to.
            None => {}
        }
        if !self.dependencies.is_empty() {
            let entries = std::mem::take(&mut self.dependencies);
            self = self.push(Dependencies::new(entries))?;
        }
        if let Some(schema) = self.contains.take() {
            let min = self.min_contains.unwrap_or(1);
            let max = self.max_contains.take();
            self = self.push(Contains::new(schema, min, max)?)?;
        }
        if let Some(if_schema) = self.if_schema.take() {
            let then_schema = self.then_schema.take();
            let else_schema = self.else_schema.take();
            if then_schema.is_some() || else_schema.is_some() {
                self = self.push(IfThenElse::new(if_schema, then_schema, else_schema))?;
            }
        }
        let media_type = self.media_type.take();
        let encoding = self.encoding.take();
        for keyword in keywords::content::assemble(media_type.as_deref(), encoding.as_deref()) {
            self = self.keyword(keyword)?;
        }

        Ok(Arc::new(Schema {
            kind: SchemaKind::Object(ObjectSchema {
                id,
                keywords: self.keywords,
            }),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fluent_construction() {
        let schema = SchemaBuilder::new()
            .type_(InstanceType::Integer)
            .unwrap()
            .minimum(Number::from(0))
            .unwrap()
            .maximum(Number::from(100))
            .unwrap()
            .build()
            .unwrap();
        assert!(schema.id().is_none());
        assert_eq!(format!("{:?}", schema), "Schema{type, minimum, maximum}");
    }

    #[test]
    fn rejects_duplicate_keywords() {
        let result = SchemaBuilder::new()
            .max_length(5)
            .unwrap()
            .max_length(6);
        assert!(matches!(
            result,
            Err(BuildError::DuplicateKeyword { .. })
        ));
    }

    #[test]
    fn rejects_empty_enum() {
        assert!(SchemaBuilder::new().enum_(vec![]).is_err());
    }

    #[test]
    fn rejects_duplicate_enum_entries() {
        assert!(SchemaBuilder::new().enum_(vec![json!(1), json!(1.0)]).is_err());
    }

    #[test]
    fn rejects_non_positive_multiple_of() {
        assert!(SchemaBuilder::new().multiple_of(Number::from(0)).is_err());
    }

    #[test]
    fn deferred_properties_become_one_keyword() {
        let sub = Schema::boolean(true);
        let schema = SchemaBuilder::new()
            .property("a", sub.clone())
            .unwrap()
            .property("b", sub)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(format!("{:?}", schema), "Schema{properties}");
    }

    #[test]
    fn unknown_format_is_lax_by_default() {
        assert!(SchemaBuilder::new().format("zzz").is_ok());
        let strict = SchemaBuilder::with_options(
            CompileOptions::default().strict_formats(true),
        );
        assert!(strict.format("zzz").is_err());
    }
}
