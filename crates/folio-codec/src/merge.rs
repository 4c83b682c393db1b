//! Metadata merging for read-merge-write updates

use crate::frontmatter::Metadata;
use serde_json::Value;

/// Merge `patch` over `base`
///
/// Nested objects merge key by key; arrays, scalars and `null` in the patch
/// replace what was there. Keys only in `base` survive.
#[must_use]
pub fn merge_metadata(mut base: Metadata, patch: Metadata) -> Metadata {
    for (key, value) in patch {
        match base.get_mut(&key) {
            Some(existing) => {
                let current = std::mem::take(existing);
                *existing = merge_values(current, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

fn merge_values(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            Value::Object(merge_metadata(base_map, patch_map))
        }
        (_, patch) => patch,
    }
}
