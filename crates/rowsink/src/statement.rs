use std::collections::HashMap;

use rowsink_core::event::{Event, Value};
use rowsink_core::flatten::{self, FlatColumn};
use rowsink_core::schema::ValueType;
use rowsink_core::{Error, Result};
use rowsink_sql::serializer::{Params, Placeholder};
use rowsink_sql::{Serializer, Statement};

/// Position and resolved type of one bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParameterBinding {
    /// 1-based positional index into the INSERT template.
    pub(crate) index: usize,
    /// The runtime type resolved at statement-generation time.
    pub(crate) ty: ValueType,
}

/// The cached INSERT template together with its field → parameter map.
///
/// Template and map are generated together from a single pass over a record's
/// flattened shape and only ever replaced as a whole. Patching either one in
/// place would let the column list and the bound positions drift apart.
#[derive(Debug)]
pub(crate) struct PreparedInsert {
    pub(crate) sql: String,
    bindings: HashMap<String, ParameterBinding>,
}

struct BindingCollector {
    bindings: HashMap<String, ParameterBinding>,
}

impl Params for BindingCollector {
    fn push(&mut self, column: &str, ty: ValueType) -> Placeholder {
        let index = self.bindings.len() + 1;
        self.bindings
            .insert(column.to_string(), ParameterBinding { index, ty });
        Placeholder(index)
    }
}

impl PreparedInsert {
    /// Builds the template and binding map from the record's shape, in field
    /// order. Field names pass the identifier guard during flattening.
    pub(crate) fn build(serializer: &Serializer, table: &str, event: &Event) -> Result<Self> {
        let mut columns = Vec::new();
        flatten::visit_event(event, &mut |name, value| {
            columns.push(FlatColumn {
                name,
                ty: value.value_type(),
            });
            Ok(())
        })?;

        if columns.is_empty() {
            return Err(Error::Record("event has no fields".to_string()));
        }

        let mut collector = BindingCollector {
            bindings: HashMap::new(),
        };
        let sql = serializer.serialize(&Statement::insert(table, &columns), &mut collector);

        Ok(Self {
            sql,
            bindings: collector.bindings,
        })
    }

    /// Whether every flattened field of `event` already has a parameter slot.
    pub(crate) fn covers(&self, event: &Event) -> Result<bool> {
        let mut all = true;
        flatten::visit_event(event, &mut |name, _| {
            if !self.bindings.contains_key(&name) {
                all = false;
            }
            Ok(())
        })?;
        Ok(all)
    }

    /// Positional values for `event`. Mapped fields the record does not carry
    /// bind as SQL NULL; list values collapse to their text form; a scalar
    /// landing in a text-typed slot binds as its text rendering.
    pub(crate) fn bind(&self, event: &Event) -> Result<Vec<Value>> {
        let mut values = vec![Value::Null; self.bindings.len()];
        flatten::visit_event(event, &mut |name, value| {
            if let Some(binding) = self.bindings.get(&name) {
                values[binding.index - 1] = coerce(value, binding.ty);
            }
            Ok(())
        })?;
        Ok(values)
    }

    pub(crate) fn parameter_count(&self) -> usize {
        self.bindings.len()
    }

    #[cfg(test)]
    pub(crate) fn binding(&self, column: &str) -> Option<ParameterBinding> {
        self.bindings.get(column).copied()
    }
}

/// Adjusts a record value to the slot it binds into, using the type recorded
/// at statement-generation time.
fn coerce(value: &Value, ty: ValueType) -> Value {
    match value {
        Value::List(items) => Value::Text(Value::list_text(items)),
        Value::Text(_) | Value::Null => value.clone(),
        scalar if ty == ValueType::Text => Value::Text(text_of(scalar)),
        other => other.clone(),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) | Value::Timestamp(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::Null => String::new(),
        Value::List(items) => Value::list_text(items),
        Value::Nested(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        Event::new()
            .with("name", "a")
            .with(
                "location",
                Event::new().with("lat", 1.0).with("lon", 2.0),
            )
    }

    #[test]
    fn template_and_map_are_generated_together() {
        let prepared =
            PreparedInsert::build(&Serializer::postgresql(), "events", &event()).unwrap();

        assert_eq!(
            prepared.sql,
            "INSERT INTO \"events\" (\"name\", \"location_lat\", \"location_lon\") \
             VALUES ($1, $2, $3);"
        );
        assert_eq!(prepared.parameter_count(), 3);
        assert_eq!(
            prepared.binding("location_lat"),
            Some(ParameterBinding {
                index: 2,
                ty: ValueType::Double
            })
        );
    }

    #[test]
    fn binds_values_in_parameter_order() {
        let prepared =
            PreparedInsert::build(&Serializer::postgresql(), "events", &event()).unwrap();
        let values = prepared.bind(&event()).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Text("a".to_string()),
                Value::Double(1.0),
                Value::Double(2.0)
            ]
        );
    }

    #[test]
    fn missing_fields_bind_as_null() {
        let prepared =
            PreparedInsert::build(&Serializer::postgresql(), "events", &event()).unwrap();
        let partial = Event::new().with("name", "b");
        let values = prepared.bind(&partial).unwrap();
        assert_eq!(
            values,
            vec![Value::Text("b".to_string()), Value::Null, Value::Null]
        );
    }

    #[test]
    fn detects_unseen_fields() {
        let prepared =
            PreparedInsert::build(&Serializer::postgresql(), "events", &event()).unwrap();
        assert!(prepared.covers(&event()).unwrap());

        let extra = event().with("extra", 5);
        assert!(!prepared.covers(&extra).unwrap());
    }

    #[test]
    fn lists_bind_as_text() {
        let event = Event::new().with(
            "tags",
            Value::List(vec![Value::Text("x".into()), Value::Text("y".into())]),
        );
        let prepared =
            PreparedInsert::build(&Serializer::postgresql(), "events", &event).unwrap();
        let values = prepared.bind(&event).unwrap();
        assert_eq!(values, vec![Value::Text(r#"["x","y"]"#.to_string())]);
    }

    #[test]
    fn scalars_degrade_to_text_in_text_typed_slots() {
        // Template generated from a record where `code` carried text; a later
        // record supplies a number for the same field without triggering a
        // rebuild, so it binds as its text rendering.
        let first = Event::new().with("code", "x1");
        let prepared =
            PreparedInsert::build(&Serializer::postgresql(), "events", &first).unwrap();

        let second = Event::new().with("code", 7);
        assert!(prepared.covers(&second).unwrap());
        let values = prepared.bind(&second).unwrap();
        assert_eq!(values, vec![Value::Text("7".to_string())]);
    }

    #[test]
    fn empty_records_are_rejected() {
        let err =
            PreparedInsert::build(&Serializer::postgresql(), "events", &Event::new()).unwrap_err();
        assert!(matches!(err, Error::Record(_)));
    }
}
