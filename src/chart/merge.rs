use serde_json::Value;

/// Deep-merge `overrides` into `base` and return the result.
///
/// For every key present in `overrides`:
/// - when both `base` and `overrides` hold a JSON object under that key, the
///   two objects are merged recursively, key by key;
/// - otherwise the override value replaces the base value outright. This
///   includes arrays, which are replaced wholesale and never concatenated or
///   merged element-wise, and `null`, which replaces whatever was there.
///
/// Keys only present in `base` are kept. An `overrides` value that is not an
/// object has no keys and leaves `base` unchanged.
pub fn merge_options(base: Value, overrides: &Value) -> Value {
    let Value::Object(source) = overrides else {
        return base;
    };
    let mut output = match base {
        Value::Object(map) => map,
        _ => return overrides.clone(),
    };

    for (key, value) in source {
        let recurse = value.is_object() && output.get(key).is_some_and(Value::is_object);
        if recurse {
            if let Some(existing) = output.get_mut(key) {
                let current = existing.take();
                *existing = merge_options(current, value);
            }
        } else {
            output.insert(key.clone(), value.clone());
        }
    }

    Value::Object(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_key_by_key() {
        let merged = merge_options(json!({"a": {"x": 1, "y": 2}}), &json!({"a": {"y": 5}}));
        assert_eq!(merged, json!({"a": {"x": 1, "y": 5}}));
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let base = json!({"series": [{"name": "a"}, {"name": "b"}], "keep": true});
        let merged = merge_options(base, &json!({"series": [{"name": "c"}]}));
        assert_eq!(merged, json!({"series": [{"name": "c"}], "keep": true}));
    }

    #[test]
    fn object_over_array_replaces() {
        let merged = merge_options(json!({"xAxis": [{"type": "time"}]}), &json!({"xAxis": {"type": "value"}}));
        assert_eq!(merged, json!({"xAxis": {"type": "value"}}));
    }

    #[test]
    fn scalars_and_null_replace() {
        let base = json!({"title": {"text": "Top 10 Users", "left": "center"}, "legend": {"bottom": 35}});
        let merged = merge_options(base, &json!({"title": {"left": "right"}, "legend": null}));
        assert_eq!(
            merged,
            json!({"title": {"text": "Top 10 Users", "left": "right"}, "legend": null})
        );
    }

    #[test]
    fn new_keys_are_added() {
        let merged = merge_options(json!({"a": 1}), &json!({"b": {"c": 2}}));
        assert_eq!(merged, json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn non_object_override_is_ignored() {
        let base = json!({"a": 1});
        assert_eq!(merge_options(base.clone(), &Value::Null), base);
        assert_eq!(merge_options(base.clone(), &json!([1, 2])), base);
    }

    #[test]
    fn base_is_not_mutated_through_shared_nesting() {
        let overrides = json!({"a": {"b": {"c": 1}}});
        let first = merge_options(json!({}), &overrides);
        let second = merge_options(first.clone(), &json!({"a": {"b": {"d": 2}}}));
        assert_eq!(first, json!({"a": {"b": {"c": 1}}}));
        assert_eq!(second, json!({"a": {"b": {"c": 1, "d": 2}}}));
    }
}
