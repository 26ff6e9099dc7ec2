//! Locating image references inside a registry record.
//!
//! The declared node names from [`RegistrySchema`] are tried first; a breadth-first
//! walk over the whole record, capped at [`MAX_WALK_NODES`], is the fallback.

use std::collections::{HashSet, VecDeque};

use serde_json::{Map, Value};

use crate::constants::{MAX_WALK_NODES, MIN_INLINE_PAYLOAD_CHARS};
use crate::registry::RegistrySchema;

/// Where image bytes for a mark can be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Base64 (bare or data URL) embedded in the record.
    Inline {
        payload: String,
        content_type: Option<String>,
    },
    /// An http(s) URL to download.
    Remote { url: String },
}

/// Returns every image reference in `record`, declared nodes first, without duplicates.
pub fn find_image_refs(schema: &RegistrySchema, record: &Value) -> Vec<ImageRef> {
    let Some(root) = record.as_object() else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |found: Vec<ImageRef>| {
        for r in found {
            if seen.insert(r.clone()) {
                refs.push(r);
            }
        }
    };

    for node in schema.image_nodes {
        if let Some(Value::Object(obj)) = root.get(*node) {
            push(inspect_with_nested(schema, obj));
        }
    }

    for node in schema.image_list_nodes {
        if let Some(Value::Array(items)) = root.get(*node) {
            for item in items {
                if let Value::Object(obj) = item {
                    push(inspect_with_nested(schema, obj));
                }
            }
        }
    }

    push(walk(schema, record));
    refs
}

/// Inspects a node's nested image object first, then the node itself.
fn inspect_with_nested(schema: &RegistrySchema, obj: &Map<String, Value>) -> Vec<ImageRef> {
    let mut found = Vec::new();
    if let Some(Value::Object(nested)) = obj.get(schema.nested_image_key) {
        found.extend(inspect_object(schema, nested));
    }
    found.extend(inspect_object(schema, obj));
    found
}

/// Breadth-first walk over objects and arrays, visiting at most `MAX_WALK_NODES` nodes.
fn walk(schema: &RegistrySchema, record: &Value) -> Vec<ImageRef> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([record]);
    let mut visited = 0usize;

    while let Some(node) = queue.pop_front() {
        if visited >= MAX_WALK_NODES {
            break;
        }
        visited += 1;

        match node {
            Value::Object(obj) => {
                found.extend(inspect_object(schema, obj));
                queue.extend(obj.values().filter(|v| v.is_object() || v.is_array()));
            }
            Value::Array(items) => {
                queue.extend(items.iter().filter(|v| v.is_object() || v.is_array()));
            }
            _ => {}
        }
    }

    found
}

/// Reads inline payloads and URLs from a single object, in key priority order.
fn inspect_object(schema: &RegistrySchema, obj: &Map<String, Value>) -> Vec<ImageRef> {
    let mut found = Vec::new();

    let content_type = schema
        .content_type_keys
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string);

    for key in schema.inline_keys {
        if let Some(Value::String(s)) = obj.get(*key)
            && s.len() > MIN_INLINE_PAYLOAD_CHARS
        {
            found.push(ImageRef::Inline {
                payload: s.clone(),
                content_type: content_type.clone(),
            });
        }
    }

    for key in schema.url_keys {
        if let Some(Value::String(s)) = obj.get(*key) {
            let url = s.trim();
            let lower = url.to_ascii_lowercase();
            if lower.starts_with("http://") || lower.starts_with("https://") {
                found.push(ImageRef::Remote {
                    url: url.to_string(),
                });
            }
        }
    }

    found
}
