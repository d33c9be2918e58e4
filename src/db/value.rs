use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use serde_json::{Number, Value as JsonValue, json};

/// Days from 0001-01-01 (CE) to the 1970-01-01 epoch DuckDB dates count from.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert one engine value into its JSON representation.
///
/// Integer widths map to JSON numbers (128-bit values fall back to decimal
/// strings when they exceed JSON number range), decimals keep their textual
/// form, blobs become standard base64, and temporal values render as
/// ISO-8601 strings. Nested containers convert recursively.
pub fn to_json(v: &Value) -> JsonValue {
    match v {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => json!(*b),
        Value::TinyInt(i) => json!(*i),
        Value::SmallInt(i) => json!(*i),
        Value::Int(i) => json!(*i),
        Value::BigInt(i) => json!(*i),
        Value::HugeInt(i) => Number::from_i128(*i)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(i.to_string())),
        Value::UTinyInt(i) => json!(*i),
        Value::USmallInt(i) => json!(*i),
        Value::UInt(i) => json!(*i),
        Value::UBigInt(i) => json!(*i),
        Value::Float(f) => json!(*f),
        Value::Double(f) => json!(*f),
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Enum(s) => JsonValue::String(s.clone()),
        Value::Blob(bytes) => JsonValue::String(BASE64.encode(bytes)),
        Value::Date32(days) => NaiveDate::from_num_days_from_ce_opt(EPOCH_DAYS_FROM_CE + days)
            .map(|d| JsonValue::String(d.to_string()))
            .unwrap_or_else(|| json!(*days)),
        Value::Time64(unit, t) => {
            let micros = unit_to_micros(unit, *t);
            let secs = (micros / 1_000_000) as u32;
            let nanos = ((micros % 1_000_000) * 1_000) as u32;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .map(|t| JsonValue::String(t.to_string()))
                .unwrap_or_else(|| json!(micros))
        }
        Value::Timestamp(unit, ts) => {
            let micros = unit_to_micros(unit, *ts);
            DateTime::from_timestamp_micros(micros)
                .map(|dt| {
                    JsonValue::String(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string())
                })
                .unwrap_or_else(|| json!(micros))
        }
        Value::Interval {
            months,
            days,
            nanos,
        } => json!({ "months": months, "days": days, "nanos": nanos }),
        Value::List(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Struct(fields) => {
            let mut obj = serde_json::Map::new();
            for (name, field) in fields.iter() {
                obj.insert(name.clone(), to_json(field));
            }
            JsonValue::Object(obj)
        }
        Value::Map(entries) => {
            let mut obj = serde_json::Map::new();
            for (key, val) in entries.iter() {
                let key = match key {
                    Value::Text(s) => s.clone(),
                    other => to_json(other).to_string(),
                };
                obj.insert(key, to_json(val));
            }
            JsonValue::Object(obj)
        }
        Value::Union(inner) => to_json(inner),
        other => JsonValue::String(format!("{other:?}")),
    }
}

fn unit_to_micros(unit: &TimeUnit, v: i64) -> i64 {
    match unit {
        TimeUnit::Second => v.saturating_mul(1_000_000),
        TimeUnit::Millisecond => v.saturating_mul(1_000),
        TimeUnit::Microsecond => v,
        TimeUnit::Nanosecond => v / 1_000,
    }
}
