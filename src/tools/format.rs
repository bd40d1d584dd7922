//! Result value rendering.
//!
//! Every column value is converted to its textual form before it is
//! embedded in a JSON response. The convention is fixed and documented:
//! - SQL NULL renders as the literal token `null`
//! - strings pass through verbatim
//! - numerics render as decimal text, booleans as `true`/`false`
//! - `DateTime`/`DateTime64` values render in ISO-8601 extended format
//!   (`Date` values are already ISO-8601 and pass through)
//! - arrays and nested structures render as compact JSON text

use chrono::{NaiveDateTime, Timelike};
use serde_json::Value as JsonValue;

/// Render a single column value as text, using the ClickHouse type name
/// reported by the server to pick temporal formatting.
pub fn render_value(value: &JsonValue, type_name: &str) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => {
            // Covers DateTime, DateTime64(n), Nullable(DateTime), and
            // timezone-qualified variants.
            if type_name.contains("DateTime") {
                to_iso8601(s).unwrap_or_else(|| s.clone())
            } else {
                s.clone()
            }
        }
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Convert the server's `YYYY-MM-DD hh:mm:ss[.fff]` rendering to ISO-8601
/// extended format. Sub-second digits are kept when present and omitted
/// when zero. Returns None for values that do not parse as a timestamp.
fn to_iso8601(s: &str) -> Option<String> {
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    if dt.nanosecond() == 0 {
        Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    } else {
        Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}
