//! Attribute path flattening.
//!
//! Rules are declared against dotted paths (`address.street`), while entities
//! hold nested attribute trees. Flattening turns a tree into an ordered map of
//! dotted path → leaf value so every validated path has exactly one value.

use indexmap::IndexMap;

use crate::value::{Attributes, Value};

/// Flattened attribute map: dotted path → leaf value, in encounter order.
pub type Flattened = IndexMap<String, Value>;

/// Flatten an attribute tree into dotted paths.
///
/// Only [`Value::Object`] is descended into. Arrays, dates, patterns and
/// entity/collection references stay whole. An empty nested object
/// contributes no paths.
///
/// If a path appears twice (a literal dotted key and the same path reached
/// through nesting), the later value wins and the first position is kept.
pub fn flatten(attrs: &Attributes) -> Flattened {
    let mut out = Flattened::new();
    flatten_into(attrs, "", &mut out);
    out
}

fn flatten_into(attrs: &Attributes, prefix: &str, out: &mut Flattened) {
    for (key, value) in attrs {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(inner) => flatten_into(inner, &path, out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Resolve a dotted path against a nested attribute tree.
///
/// A literal key containing dots takes precedence over nested resolution.
pub fn lookup<'a>(attrs: &'a Attributes, path: &str) -> Option<&'a Value> {
    if let Some(v) = attrs.get(path) {
        return Some(v);
    }

    let (head, rest) = path.split_once('.')?;
    match attrs.get(head)? {
        Value::Object(inner) => lookup(inner, rest),
        _ => None,
    }
}
