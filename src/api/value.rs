//! Firestore REST typed values <-> plain JSON.
//!
//! Firestore wraps every value in a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). The rest of the crate only
//! sees `serde_json::Value`, so the codec lives here and nowhere else.

use crate::store::Record;
use serde_json::{json, Map, Value};

pub(crate) fn encode_value(v: &Value) -> Value {
    match v {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(0.0) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode_value).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub(crate) fn encode_fields(fields: &Record) -> Value {
    let out: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(out)
}

pub(crate) fn decode_value(v: &Value) -> Value {
    let Some(obj) = v.as_object() else {
        return Value::Null;
    };

    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        // int64 travels as a decimal string.
        return match i {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(s.clone())),
            other => other.clone(),
        };
    }
    if let Some(d) = obj.get("doubleValue") {
        return match d {
            Value::Number(_) => d.clone(),
            // "NaN" / "Infinity" have no JSON representation.
            _ => Value::Null,
        };
    }
    if obj.contains_key("nullValue") {
        return Value::Null;
    }
    for key in ["timestampValue", "referenceValue", "bytesValue"] {
        if let Some(s) = obj.get(key) {
            return s.clone();
        }
    }
    if let Some(geo) = obj.get("geoPointValue") {
        return json!({
            "latitude": geo.get("latitude").cloned().unwrap_or(Value::from(0.0)),
            "longitude": geo.get("longitude").cloned().unwrap_or(Value::from(0.0)),
        });
    }
    if let Some(arr) = obj.get("arrayValue") {
        let values = arr
            .get("values")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = obj.get("mapValue") {
        return Value::Object(decode_fields(map.get("fields")));
    }

    Value::Null
}

/// Decodes a document's `fields` object; a document with no fields omits the key entirely.
pub(crate) fn decode_fields(fields: Option<&Value>) -> Record {
    fields
        .and_then(|f| f.as_object())
        .map(|f| f.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!("100")), json!({"stringValue": "100"}));
        assert_eq!(encode_value(&json!(100)), json!({"integerValue": "100"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&Value::Null), json!({"nullValue": null}));
    }

    #[test]
    fn test_encode_nested_document() {
        let mut fields = Record::new();
        fields.insert("maxUsers".into(), json!("100"));
        fields.insert("flags".into(), json!({"png": "a.png", "tags": []}));

        let encoded = encode_fields(&fields);
        assert_eq!(encoded["maxUsers"], json!({"stringValue": "100"}));
        assert_eq!(
            encoded["flags"]["mapValue"]["fields"]["png"],
            json!({"stringValue": "a.png"})
        );
        assert_eq!(
            encoded["flags"]["mapValue"]["fields"]["tags"],
            json!({"arrayValue": {}})
        );
    }

    #[test]
    fn test_decode_country_document_shape() {
        let fields = json!({
            "countries": {"arrayValue": {"values": [
                {"mapValue": {"fields": {
                    "name": {"stringValue": "India"},
                    "population": {"integerValue": "1380004385"},
                    "area": {"doubleValue": 3287590.0},
                    "independent": {"booleanValue": true},
                    "capital": {"nullValue": null}
                }}}
            ]}}
        });

        let rec = decode_fields(Some(&fields));
        let india = &rec["countries"][0];
        assert_eq!(india["name"], "India");
        assert_eq!(india["population"], 1_380_004_385_i64);
        assert_eq!(india["area"], 3_287_590.0);
        assert_eq!(india["independent"], true);
        assert!(india["capital"].is_null());
    }

    #[test]
    fn test_decode_special_values() {
        assert_eq!(
            decode_value(&json!({"timestampValue": "2025-01-05T09:37:00Z"})),
            json!("2025-01-05T09:37:00Z")
        );
        assert_eq!(
            decode_value(&json!({"geoPointValue": {"latitude": 27.17, "longitude": 78.04}})),
            json!({"latitude": 27.17, "longitude": 78.04})
        );
        assert_eq!(decode_value(&json!({"doubleValue": "NaN"})), Value::Null);
        assert_eq!(decode_value(&json!({"arrayValue": {}})), json!([]));
        assert_eq!(decode_value(&json!({"mapValue": {}})), json!({}));
        assert_eq!(decode_value(&json!("not typed")), Value::Null);
    }

    #[test]
    fn test_decode_missing_fields_is_empty_record() {
        assert!(decode_fields(None).is_empty());
    }

    #[test]
    fn test_encoded_config_entry_decodes_back() {
        let mut fields = Record::new();
        fields.insert("maintenance".into(), json!("off"));
        let decoded = decode_fields(Some(&encode_fields(&fields)));
        assert_eq!(decoded, fields);
    }
}
