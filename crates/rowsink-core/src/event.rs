//! Event records as they arrive from the pipeline.
//!
//! A record is an ordered mapping from field name to [`Value`]. Values form a
//! tree: scalars at the leaves, nested records for grouped fields, and flat
//! lists of scalars. Records are tree-shaped by construction; cycles are not
//! representable.

use indexmap::IndexMap;

use crate::schema::ValueType;
use crate::{Error, Result};

/// A single field value. The variants are matched exhaustively wherever
/// records are flattened or bound, so adding one is a compile-visible change.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    /// Epoch milliseconds.
    Timestamp(i64),
    Null,
    /// A nested record.
    Nested(Event),
    /// A homogeneous sequence of scalars, persisted as text.
    List(Vec<Value>),
}

impl Value {
    /// The value's runtime type, used to resolve column types at
    /// statement-generation time.
    ///
    /// Unknown shapes degrade to text storage rather than failing: `Null` has
    /// no type of its own and lists are stored in a single text column.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::BigInt(_) => ValueType::BigInt,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Text(_) => ValueType::Text,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Null | Value::Nested(_) | Value::List(_) => ValueType::Text,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Nested(_) | Value::List(_))
    }

    /// Renders a list value as the JSON text stored in its single text
    /// column.
    pub fn list_text(items: &[Value]) -> String {
        serde_json::Value::Array(items.iter().map(Value::to_json).collect()).to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::BigInt(v) | Value::Timestamp(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Value::from(*v as f64),
            Value::Double(v) => serde_json::Value::from(*v),
            Value::Text(v) => serde_json::Value::String(v.clone()),
            Value::Null => serde_json::Value::Null,
            Value::Nested(event) => serde_json::Value::Object(
                event
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect(),
            ),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Event> for Value {
    fn from(v: Event) -> Self {
        Value::Nested(v)
    }
}

/// An ordered name → value record. Insertion order is preserved and drives
/// positional parameter indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    fields: IndexMap<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON document, resolving value types from the
    /// JSON runtime representation.
    ///
    /// The document must be an object. Arrays may only contain scalars;
    /// anything else in an array position is a malformed record.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(Error::Record("event must be a JSON object".to_string()));
        };

        let mut event = Event::new();
        for (name, value) in map {
            event.set(name.clone(), Value::from_json(value, name)?);
        }
        Ok(event)
    }
}

impl Value {
    fn from_json(json: &serde_json::Value, field: &str) -> Result<Self> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(*v),
            serde_json::Value::Number(n) => number_value(n, field)?,
            serde_json::Value::String(v) => Value::Text(v.clone()),
            serde_json::Value::Array(items) => {
                let mut scalars = Vec::with_capacity(items.len());
                for item in items {
                    let value = Value::from_json(item, field)?;
                    if !value.is_scalar() {
                        return Err(Error::Record(format!(
                            "field `{field}` contains a non-scalar list element"
                        )));
                    }
                    scalars.push(value);
                }
                Value::List(scalars)
            }
            serde_json::Value::Object(_) => Value::Nested(Event::from_json(json)?),
        })
    }
}

fn number_value(n: &serde_json::Number, field: &str) -> Result<Value> {
    if let Some(v) = n.as_i64() {
        Ok(Value::BigInt(v))
    } else if let Some(v) = n.as_f64() {
        Ok(Value::Double(v))
    } else {
        Err(Error::Record(format!(
            "field `{field}` holds a number outside the supported range"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_types_resolve_from_values() {
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
        assert_eq!(Value::Int(1).value_type(), ValueType::Int);
        assert_eq!(Value::BigInt(1).value_type(), ValueType::BigInt);
        assert_eq!(Value::Double(1.0).value_type(), ValueType::Double);
        assert_eq!(Value::Text("x".into()).value_type(), ValueType::Text);
        // Unknown shapes fall back to text storage.
        assert_eq!(Value::Null.value_type(), ValueType::Text);
        assert_eq!(Value::List(vec![]).value_type(), ValueType::Text);
    }

    #[test]
    fn from_json_resolves_runtime_types() {
        let json = serde_json::json!({
            "name": "a",
            "count": 5,
            "ratio": 0.5,
            "ok": true,
            "missing": null,
            "location": { "lat": 1.0, "lon": 2.0 },
            "tags": ["x", "y"],
        });

        let event = Event::from_json(&json).unwrap();
        assert_eq!(event.get("name"), Some(&Value::Text("a".into())));
        assert_eq!(event.get("count"), Some(&Value::BigInt(5)));
        assert_eq!(event.get("ratio"), Some(&Value::Double(0.5)));
        assert_eq!(event.get("ok"), Some(&Value::Bool(true)));
        assert_eq!(event.get("missing"), Some(&Value::Null));
        assert!(matches!(event.get("location"), Some(Value::Nested(_))));
        assert_eq!(
            event.get("tags"),
            Some(&Value::List(vec![
                Value::Text("x".into()),
                Value::Text("y".into())
            ]))
        );
    }

    #[test]
    fn from_json_rejects_non_object_roots() {
        assert!(Event::from_json(&serde_json::json!([1, 2])).is_err());
        assert!(Event::from_json(&serde_json::json!("x")).is_err());
    }

    #[test]
    fn from_json_rejects_nested_list_elements() {
        let json = serde_json::json!({ "broken": [{ "a": 1 }] });
        assert!(Event::from_json(&json).is_err());
    }

    #[test]
    fn lists_render_as_json_text() {
        let items = vec![Value::Text("x".into()), Value::BigInt(2)];
        assert_eq!(Value::list_text(&items), r#"["x",2]"#);
    }
}
