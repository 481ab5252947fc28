use serde_json::{Map, Value};

/// Rewrite JSON-Schema `type` descriptors into the lower-case spelling the
/// chat-completions side requires.
///
/// This is the single point of truth for the rewrite; every schema crossing
/// the protocol boundary (tool declarations, the synthetic forced-JSON
/// schema) goes through here. The walk recurses through `properties`,
/// `items` and `parameters`; all other fields are copied verbatim, key
/// order preserved. Non-object, non-array values are returned unchanged.
///
/// The input is never mutated; callers rely on the original surviving for
/// logging.
#[must_use]
pub fn normalize_schema_types(schema: &Value) -> Value {
    match schema {
        Value::Array(items) => Value::Array(items.iter().map(normalize_schema_types).collect()),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, value) in fields {
                let rewritten = match key.as_str() {
                    "type" => match value {
                        Value::String(t) => Value::String(t.to_lowercase()),
                        other => other.clone(),
                    },
                    "properties" => match value {
                        Value::Object(props) => Value::Object(
                            props
                                .iter()
                                .map(|(name, prop)| (name.clone(), normalize_schema_types(prop)))
                                .collect(),
                        ),
                        other => other.clone(),
                    },
                    "items" | "parameters" => normalize_schema_types(value),
                    _ => value.clone(),
                };
                out.insert(key.clone(), rewritten);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}
