//! Conversions between stored BSON documents and client-facing JSON.

use chrono::{SecondsFormat, Utc};
use mongodb::bson::{Bson, DateTime, Document};
use serde_json::Value;

/// Renders a stored document as JSON: `_id` and other ObjectIds become hex
/// strings and dates become ISO-8601 strings with millisecond precision.
pub fn to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

pub fn to_json_list(documents: Vec<Document>) -> Vec<Value> {
    documents.into_iter().map(to_json).collect()
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(date) => iso_string(date)
            .map(Value::String)
            .unwrap_or_else(|| Value::from(date.timestamp_millis())),
        Bson::Document(document) => to_json(document),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Double(v) => serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::Int32(v) => Value::from(v),
        Bson::Int64(v) => Value::from(v),
        Bson::String(v) => Value::String(v),
        Bson::Boolean(v) => Value::Bool(v),
        Bson::Null => Value::Null,
        other => other.into_relaxed_extjson(),
    }
}

/// `2024-05-01T10:00:00.000Z`
pub fn iso_string(date: DateTime) -> Option<String> {
    chrono::DateTime::<Utc>::from_timestamp_millis(date.timestamp_millis())
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn to_bson_datetime(date: chrono::DateTime<Utc>) -> DateTime {
    DateTime::from_millis(date.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_object_id_and_dates_become_strings() {
        let id = ObjectId::new();
        let json = to_json(doc! {
            "_id": id,
            "paidAt": DateTime::from_millis(1_714_557_600_000),
            "amount": 50.5,
            "tags": ["a", "b"],
        });

        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["paidAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(json["amount"], 50.5);
        assert_eq!(json["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_iso_string_round_trips_chrono() {
        let now = Utc::now();
        let rendered = iso_string(to_bson_datetime(now)).unwrap();
        assert_eq!(rendered, now.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}
