//! One module per schema keyword, each owning its compiled representation
//! and the evaluators it spawns.
pub(crate) mod additional_items;
pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod annotations;
pub(crate) mod any_of;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod content;
pub(crate) mod definitions;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod helpers;
pub(crate) mod if_;
pub(crate) mod items;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod pattern_properties;
pub(crate) mod properties;
pub(crate) mod property_names;
pub(crate) mod required;
pub(crate) mod type_;
pub(crate) mod unique_items;

use crate::error::BuildError;
use crate::eval::Eval;
use crate::instance_type::InstanceType;
use std::fmt::Debug;
use std::sync::Arc;

/// A named contribution to a schema.
///
/// Assertions and combiners return evaluators for the instance types they
/// constrain; for every other type they return `None`, which reads as
/// vacuously true in the affirmative polarity and as "contributes nothing"
/// under negation. Annotations always return `None`.
pub(crate) trait Keyword: Send + Sync + Debug {
    fn name(&self) -> &str;
    /// Whether this keyword constrains instances of `ty`; mirrors
    /// `evaluator` returning `Some`. Annotations constrain nothing.
    fn applies_to(&self, ty: InstanceType) -> bool;
    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval>;
    /// Write this keyword's JSON form into `map`. Keywords that expand to
    /// several names (`contains` bounds, the content pair, the conditional)
    /// emit every pair they own.
    fn serialize(&self, map: &mut serde_json::Map<String, serde_json::Value>);
    /// `true` when the keyword can already tell that no instance of `ty`
    /// passes, letting the schema collapse to the keyword's single failure.
    fn rejects_type(&self, _ty: InstanceType) -> bool {
        false
    }
}

pub(crate) type KeywordRef = Arc<dyn Keyword>;
pub(crate) type CompileResult = Option<Result<KeywordRef, BuildError>>;

pub(crate) fn ok(keyword: impl Keyword + 'static) -> CompileResult {
    Some(Ok(Arc::new(keyword)))
}

pub(crate) fn fail(error: BuildError) -> CompileResult {
    Some(Err(error))
}
