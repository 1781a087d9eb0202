//! The embedded Draft-07 meta-schema.
use crate::schemas::Schema;
use std::sync::Arc;

pub(crate) const DRAFT07_TEXT: &str = include_str!("draft07.json");

lazy_static::lazy_static! {
    static ref DRAFT07: Arc<Schema> = {
        let document =
            serde_json::from_str(DRAFT07_TEXT).expect("the embedded meta-schema is valid JSON");
        Schema::compile(&document).expect("the embedded meta-schema compiles")
    };
}

/// The compiled Draft-07 meta-schema, used to validate schema documents
/// themselves.
pub fn meta_schema() -> &'static Arc<Schema> {
    &DRAFT07
}
