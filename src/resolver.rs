//! `$id`/`$ref` bookkeeping and late-bound dereferencing.
//!
//! Reading a document is pass one: every subschema is registered under its
//! canonical addresses and every `$ref` site is collected. `resolve_all` is
//! pass two: each site is matched against the registry and its target slot
//! filled. Sites that stay unresolved keep an empty slot, which the engine
//! turns into a dereference problem the first time an instance reaches them.
use crate::schemas::{Schema, SchemaKind};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use url::Url;

/// One canonical string per schema address. The fragment is percent-decoded
/// (JSON Pointers travel percent-encoded inside URIs) and an empty fragment
/// is the same address as no fragment at all.
pub(crate) fn canonical(url: &Url) -> String {
    let mut base = url.clone();
    base.set_fragment(None);
    match url.fragment() {
        Some(fragment) if !fragment.is_empty() => {
            let decoded = percent_decode_str(fragment).decode_utf8_lossy();
            format!("{}#{}", base, decoded)
        }
        _ => base.to_string(),
    }
}

pub(crate) struct RefRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    refs: Vec<Arc<Schema>>,
}

impl RefRegistry {
    pub(crate) fn new() -> RefRegistry {
        RefRegistry {
            schemas: HashMap::new(),
            refs: Vec::new(),
        }
    }

    /// Register `schema` under `address`. First registration wins, which
    /// keeps an outer `$id` authoritative over pointer aliases.
    pub(crate) fn register(&mut self, address: &Url, schema: &Arc<Schema>) {
        self.schemas
            .entry(canonical(address))
            .or_insert_with(|| Arc::clone(schema));
    }

    pub(crate) fn register_ref(&mut self, reference: &Arc<Schema>) {
        self.refs.push(Arc::clone(reference));
    }

    /// Link every collected `$ref` site, returning the references that could
    /// not be resolved.
    pub(crate) fn resolve_all(&mut self) -> Vec<Url> {
        let mut unresolved = Vec::new();
        for site in &self.refs {
            if let SchemaKind::Ref(ref_schema) = &site.kind {
                match self.schemas.get(&canonical(&ref_schema.reference)) {
                    Some(target) => {
                        *ref_schema.target.write() = Some(Arc::downgrade(target));
                    }
                    None => unresolved.push(ref_schema.reference.clone()),
                }
            }
        }
        unresolved
    }
}

impl std::fmt::Debug for RefRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RefRegistry({} schemas, {} refs)",
            self.schemas.len(),
            self.refs.len()
        )
    }
}

/// Dereference helper shared by the engine: `None` when dangling.
pub(crate) fn deref(slot: &parking_lot::RwLock<Option<Weak<Schema>>>) -> Option<Arc<Schema>> {
    slot.read().as_ref().and_then(Weak::upgrade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_addresses() {
        let url = Url::parse("json-schema:///#/definitions/a").unwrap();
        assert_eq!(canonical(&url), "json-schema:///#/definitions/a");
        let url = Url::parse("json-schema:///#").unwrap();
        assert_eq!(canonical(&url), "json-schema:///");
        let url = Url::parse("http://example.com/s.json#/a%20b").unwrap();
        assert_eq!(canonical(&url), "http://example.com/s.json#/a b");
    }
}
