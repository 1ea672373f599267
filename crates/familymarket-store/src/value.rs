//! Firestore REST value codec.
//!
//! The REST API wraps every field in a typed envelope
//! (`{"stringValue": "x"}`, `{"mapValue": {"fields": {...}}}`, ...).
//! Decoding to plain JSON happens here and nowhere else.

use serde_json::{json, Map, Value};

/// Decode one wrapped Firestore value into plain JSON.
pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = obj.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(i) = obj.get("integerValue") {
        // Integers arrive as strings to survive 64-bit precision.
        let parsed = i
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| i.as_i64());
        return parsed.map(|n| json!(n)).unwrap_or(Value::Null);
    }
    if let Some(d) = obj.get("doubleValue").and_then(Value::as_f64) {
        return json!(d);
    }
    if let Some(b) = obj.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if obj.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(ts) = obj.get("timestampValue").and_then(Value::as_str) {
        return Value::String(ts.to_string());
    }
    if let Some(r) = obj.get("referenceValue").and_then(Value::as_str) {
        return Value::String(r.to_string());
    }
    if let Some(arr) = obj.get("arrayValue") {
        let items = arr
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(items);
    }
    if let Some(map) = obj.get("mapValue") {
        return map
            .get("fields")
            .and_then(Value::as_object)
            .map(decode_fields)
            .unwrap_or_else(|| json!({}));
    }

    Value::Null
}

/// Decode a document's `fields` map into a plain JSON object.
pub fn decode_fields(fields: &Map<String, Value>) -> Value {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value));
    }
    Value::Object(out)
}

/// Encode plain JSON into the wrapped representation, for writes.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a plain JSON object as a document `fields` map.
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        out.insert(key.clone(), encode_value(value));
    }
    Value::Object(out)
}

/// Last path segment of a document resource name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_listing_document() {
        let fields = json!({
            "nombre": { "stringValue": "Torta de Chocolate Artesanal" },
            "estado": { "stringValue": "disponible" },
            "vistas": { "integerValue": "42" },
            "precio": { "doubleValue": 1500.5 },
            "destacado": { "booleanValue": true },
            "palabrasClave": {
                "arrayValue": { "values": [
                    { "stringValue": "torta" },
                    { "stringValue": "chocolate" }
                ]}
            },
            "suscripcion": {
                "mapValue": { "fields": { "estado": { "stringValue": "activa" } } }
            }
        });

        let decoded = decode_fields(fields.as_object().unwrap());
        assert_eq!(decoded["nombre"], "Torta de Chocolate Artesanal");
        assert_eq!(decoded["vistas"], 42);
        assert_eq!(decoded["precio"], 1500.5);
        assert_eq!(decoded["destacado"], true);
        assert_eq!(decoded["palabrasClave"][1], "chocolate");
        assert_eq!(decoded["suscripcion"]["estado"], "activa");
    }

    #[test]
    fn test_decode_empty_array_and_unknown() {
        assert_eq!(decode_value(&json!({ "arrayValue": {} })), json!([]));
        assert_eq!(decode_value(&json!({ "somethingElse": 1 })), Value::Null);
        assert_eq!(decode_value(&json!("bare")), Value::Null);
    }

    #[test]
    fn test_encode_subscription_write() {
        let plain = json!({ "suscripcion": { "estado": "activa" } });
        let encoded = encode_fields(plain.as_object().unwrap());
        assert_eq!(
            encoded["suscripcion"]["mapValue"]["fields"]["estado"]["stringValue"],
            "activa"
        );
    }

    #[test]
    fn test_document_id() {
        let name = "projects/p/databases/(default)/documents/productos/abc123";
        assert_eq!(document_id(name), "abc123");
        assert_eq!(document_id("abc123"), "abc123");
    }
}
