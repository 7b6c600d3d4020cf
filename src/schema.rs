//! Connector parameter schemas -> voice platform parameter schemas.
//!
//! The conversion is total: any JSON value, well-formed or not, produces a
//! `{type: "object", properties, required}` tree in which every leaf has a
//! non-empty description. The platform rejects leaves without one.

use serde_json::{json, Map, Value};

/// Nodes nested deeper than this collapse to a described string.
const MAX_DEPTH: usize = 32;

const PRIMITIVES: &[&str] = &["string", "number", "integer", "boolean"];

/// Convert an object schema. Anything that isn't one yields the empty object
/// schema.
pub fn convert_schema(node: &Value) -> Value {
    convert_object(node, 0)
}

/// Convert a single property schema into a platform descriptor.
pub fn convert_property(node: &Value) -> Value {
    convert_node(node, 0)
}

fn empty_object() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

fn convert_object(node: &Value, depth: usize) -> Value {
    let Some(obj) = node.as_object() else {
        return empty_object();
    };
    let is_object = match declared_type(obj) {
        Some(t) => t == "object",
        None => obj.get("properties").is_some_and(Value::is_object),
    };
    if !is_object {
        return empty_object();
    }

    let mut properties = Map::new();
    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        for (name, prop) in props {
            properties.insert(name.clone(), convert_node(prop, depth + 1));
        }
    }

    let required: Vec<Value> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| properties.contains_key(*name))
                .map(|name| Value::String(name.to_string()))
                .collect()
        })
        .unwrap_or_default();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn convert_node(node: &Value, depth: usize) -> Value {
    let Some(obj) = node.as_object() else {
        return leaf("string", None);
    };
    if depth > MAX_DEPTH {
        return leaf("string", description_of(obj));
    }

    // Unions take their first non-null branch; the outer description wins.
    if declared_type(obj).is_none() {
        if let Some(branch) = first_branch(obj) {
            let mut converted = convert_node(branch, depth + 1);
            if let Some(desc) = description_of(obj) {
                converted["description"] = Value::String(desc);
            }
            return converted;
        }
    }

    let kind = declared_type(obj).unwrap_or_else(|| {
        if obj.get("properties").is_some_and(Value::is_object) {
            "object".into()
        } else if obj.contains_key("items") {
            "array".into()
        } else {
            "string".into()
        }
    });

    match kind.as_str() {
        "object" => {
            let mut converted = convert_object(node, depth);
            converted["description"] =
                Value::String(description_of(obj).unwrap_or_else(|| synthesized("object")));
            converted
        }
        "array" => {
            let items = match obj.get("items") {
                Some(items) => convert_node(items, depth + 1),
                None => leaf("string", None),
            };
            json!({
                "type": "array",
                "items": items,
                "description": description_of(obj).unwrap_or_else(|| synthesized("array")),
            })
        }
        other => {
            let primitive = if PRIMITIVES.contains(&other) { other } else { "string" };
            let mut converted = leaf(primitive, description_of(obj));
            if let Some(values) = obj.get("enum").filter(|v| v.is_array()) {
                converted["enum"] = values.clone();
            }
            converted
        }
    }
}

fn leaf(kind: &str, description: Option<String>) -> Value {
    json!({
        "type": kind,
        "description": description.unwrap_or_else(|| synthesized(kind)),
    })
}

/// `type` as a string; for `["string", "null"]` style unions, the first
/// non-null entry.
fn declared_type(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("type")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(str::to_string),
        _ => None,
    }
}

fn first_branch(obj: &Map<String, Value>) -> Option<&Value> {
    ["anyOf", "oneOf", "allOf"]
        .iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_array))
        .flatten()
        .find(|branch| {
            branch
                .as_object()
                .is_some_and(|b| b.get("type").and_then(Value::as_str) != Some("null"))
        })
}

fn description_of(obj: &Map<String, Value>) -> Option<String> {
    ["description", "title"]
        .iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn synthesized(kind: &str) -> String {
    match kind {
        "integer" => "Integer value",
        "number" => "Number value",
        "boolean" => "Boolean value",
        "object" => "Object value",
        "array" => "List of values",
        _ => "String value",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_objects() {
        let input = json!({
            "type": "object",
            "properties": {
                "q": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"id": {"type": "integer"}}}
                }
            },
            "required": ["q"]
        });
        let out = convert_schema(&input);

        assert_eq!(out["type"], "object");
        assert_eq!(out["required"], json!(["q"]));
        assert_eq!(out["properties"]["q"]["type"], "array");
        assert_eq!(out["properties"]["q"]["items"]["type"], "object");
        assert_eq!(
            out["properties"]["q"]["items"]["properties"]["id"],
            json!({"type": "integer", "description": "Integer value"})
        );
    }

    #[test]
    fn malformed_inputs_yield_empty_object() {
        let empty = json!({"type": "object", "properties": {}, "required": []});
        for input in [
            Value::Null,
            json!([1, 2, 3]),
            json!("object"),
            json!(42),
            json!({}),
            json!({"type": "string"}),
            json!({"type": 7, "properties": []}),
        ] {
            assert_eq!(convert_schema(&input), empty, "{input}");
        }
    }

    #[test]
    fn deeply_malformed_nested_input() {
        let input = json!({
            "type": "object",
            "properties": {
                "a": null,
                "b": [1, "x"],
                "c": {"type": "array", "items": "nope"},
                "d": {"type": "object", "properties": "bad", "required": "bad"},
                "e": {"type": ["null"]},
                "f": {"anyOf": "bad"}
            },
            "required": ["a", 5, null, "missing"]
        });
        let out = convert_schema(&input);
        assert_eq!(out["required"], json!(["a"]));
        for key in ["a", "b", "e", "f"] {
            assert_eq!(out["properties"][key]["type"], "string", "{key}");
            assert_eq!(out["properties"][key]["description"], "String value");
        }
        assert_eq!(out["properties"]["c"]["items"]["type"], "string");
        assert_eq!(out["properties"]["d"]["properties"], json!({}));
        assert_eq!(out["properties"]["d"]["required"], json!([]));
    }

    #[test]
    fn leaves_always_have_descriptions() {
        let input = json!({
            "type": "object",
            "properties": {
                "count": {"type": "number"},
                "active": {"type": "boolean", "description": "   "},
                "when": {"type": "string", "title": "Start time"},
                "kind": {"type": "string", "enum": ["a", "b"], "description": "Kind"},
                "odd": {"type": "string", "enum": "a,b"}
            }
        });
        let out = convert_schema(&input);
        let props = &out["properties"];
        assert_eq!(props["count"], json!({"type": "number", "description": "Number value"}));
        assert_eq!(props["active"]["description"], "Boolean value");
        assert_eq!(props["when"]["description"], "Start time");
        assert_eq!(props["kind"]["enum"], json!(["a", "b"]));
        assert!(props["odd"].get("enum").is_none());
    }

    #[test]
    fn array_without_items_defaults_to_strings() {
        let out = convert_property(&json!({"type": "array", "description": "Emails"}));
        assert_eq!(
            out,
            json!({
                "type": "array",
                "items": {"type": "string", "description": "String value"},
                "description": "Emails"
            })
        );
    }

    #[test]
    fn unions_and_inferred_types() {
        let input = json!({
            "properties": {
                "limit": {"type": ["integer", "null"]},
                "cursor": {"anyOf": [{"type": "null"}, {"type": "string"}], "description": "Page cursor"},
                "tags": {"items": {"type": "string"}},
                "owner": {"properties": {"id": {"type": "string"}}, "required": ["id"]},
                "weird": {"type": "date-time"}
            }
        });
        let out = convert_schema(&input);
        let props = &out["properties"];
        assert_eq!(out["type"], "object");
        assert_eq!(props["limit"]["type"], "integer");
        assert_eq!(props["cursor"], json!({"type": "string", "description": "Page cursor"}));
        assert_eq!(props["tags"]["type"], "array");
        assert_eq!(props["owner"]["type"], "object");
        assert_eq!(props["owner"]["required"], json!(["id"]));
        assert_eq!(props["weird"]["type"], "string");
    }

    #[test]
    fn excessive_nesting_is_cut_off() {
        let mut node = json!({"type": "string"});
        for _ in 0..200 {
            node = json!({"type": "object", "properties": {"next": node}});
        }
        let out = convert_schema(&node);
        assert_eq!(out["type"], "object");

        let mut cursor = &out;
        let mut levels = 0;
        while cursor["type"] == "object" {
            cursor = &cursor["properties"]["next"];
            levels += 1;
        }
        assert!(levels <= MAX_DEPTH + 2);
        assert_eq!(cursor["type"], "string");
    }
}
