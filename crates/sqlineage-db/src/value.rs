//! Conversions between SQLite values, JSON and CSV text

use rusqlite::types::{Value, ValueRef};
use serde_json::Value as Json;

/// Quote an identifier for interpolation into SQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Bind a JSON parameter as a SQLite value
pub(crate) fn json_to_sql(param: &Json) -> Value {
    match param {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Integer(i64::from(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
        },
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Render a column value as JSON; blobs become hex strings
pub(crate) fn sql_to_json(value: ValueRef<'_>) -> Json {
    match value {
        ValueRef::Null => Json::Null,
        ValueRef::Integer(i) => Json::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        ValueRef::Text(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Json::String(hex::encode(bytes)),
    }
}

/// Render a column value as a CSV field; NULL is an empty field
pub(crate) fn sql_to_field(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => real_to_field(f),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => hex::encode(bytes),
    }
}

/// Reals always carry a fractional part, so `1.0` reads back as a real
fn real_to_field(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn json_params_bind_to_sqlite_values() {
        assert_eq!(json_to_sql(&json!(null)), Value::Null);
        assert_eq!(json_to_sql(&json!(true)), Value::Integer(1));
        assert_eq!(json_to_sql(&json!(42)), Value::Integer(42));
        assert_eq!(json_to_sql(&json!(2.5)), Value::Real(2.5));
        assert_eq!(json_to_sql(&json!("x")), Value::Text("x".to_string()));
        assert_eq!(json_to_sql(&json!([1, 2])), Value::Text("[1,2]".to_string()));
    }

    #[test]
    fn column_values_render_as_json_and_csv() {
        assert_eq!(sql_to_json(ValueRef::Integer(7)), json!(7));
        assert_eq!(sql_to_json(ValueRef::Text(b"hi")), json!("hi"));
        assert_eq!(sql_to_json(ValueRef::Blob(&[0xde, 0xad])), json!("dead"));
        assert_eq!(sql_to_field(ValueRef::Null), "");
        assert_eq!(sql_to_field(ValueRef::Real(1.5)), "1.5");
        assert_eq!(sql_to_field(ValueRef::Real(1.0)), "1.0");
        assert_eq!(sql_to_field(ValueRef::Real(-3.0)), "-3.0");
    }
}
