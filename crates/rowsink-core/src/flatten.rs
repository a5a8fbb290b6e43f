//! Recursive flattening of nested schemas and records into flat column lists.
//!
//! Both walks join ancestor names with `_` in declaration order, so a nested
//! property `location` containing `lat` becomes the column `location_lat`.
//! The same traversal backs DDL column-list generation, INSERT template and
//! parameter-map generation from a live record, and record-versus-table
//! validation; callers supply the visitor.

use crate::event::{Event, Value};
use crate::ident;
use crate::schema::{Property, PropertyKind, ValueType};
use crate::Result;

/// One flattened column: qualified name plus abstract value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatColumn {
    pub name: String,
    pub ty: ValueType,
}

/// Joins a path prefix and a segment with the flattening separator.
pub fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}_{name}")
    }
}

/// Walks a schema in declaration order, invoking `visit` once per leaf with
/// the qualified column name and its declared type.
///
/// Every name segment passes the identifier guard before it can reach
/// generated SQL. Lists of primitives visit as a single text column.
pub fn visit_schema<F>(properties: &[Property], visit: &mut F) -> Result<()>
where
    F: FnMut(String, ValueType) -> Result<()>,
{
    walk_properties(properties, "", visit)
}

fn walk_properties<F>(properties: &[Property], prefix: &str, visit: &mut F) -> Result<()>
where
    F: FnMut(String, ValueType) -> Result<()>,
{
    for property in properties {
        ident::validate(&property.name, "column name")?;
        let qualified = qualify(prefix, &property.name);
        match &property.kind {
            PropertyKind::Primitive(ty) => visit(qualified, *ty)?,
            PropertyKind::Nested(children) => walk_properties(children, &qualified, visit)?,
            PropertyKind::List(_) => visit(qualified, ValueType::Text)?,
        }
    }
    Ok(())
}

/// Collects the flattened column list of a schema.
pub fn flatten_schema(properties: &[Property]) -> Result<Vec<FlatColumn>> {
    let mut columns = Vec::new();
    visit_schema(properties, &mut |name, ty| {
        columns.push(FlatColumn { name, ty });
        Ok(())
    })?;
    Ok(columns)
}

/// Walks a record in field order, invoking `visit` once per leaf with the
/// qualified column name and the value found there.
///
/// Nested records recurse; scalars, nulls and lists are leaves.
pub fn visit_event<'a, F>(event: &'a Event, visit: &mut F) -> Result<()>
where
    F: FnMut(String, &'a Value) -> Result<()>,
{
    walk_event(event, "", visit)
}

fn walk_event<'a, F>(event: &'a Event, prefix: &str, visit: &mut F) -> Result<()>
where
    F: FnMut(String, &'a Value) -> Result<()>,
{
    for (name, value) in event.iter() {
        ident::validate(name, "column name")?;
        let qualified = qualify(prefix, name);
        match value {
            Value::Nested(child) => walk_event(child, &qualified, visit)?,
            leaf => visit(qualified, leaf)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_schema() -> Vec<Property> {
        vec![
            Property::primitive("name", ValueType::Text),
            Property::nested(
                "location",
                vec![
                    Property::primitive("lat", ValueType::Double),
                    Property::primitive("lon", ValueType::Double),
                ],
            ),
        ]
    }

    #[test]
    fn flattens_nested_properties_in_declaration_order() {
        let columns = flatten_schema(&location_schema()).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["name", "location_lat", "location_lon"]);
        assert_eq!(columns[1].ty, ValueType::Double);
    }

    #[test]
    fn name_construction_round_trips() {
        // With '_'-free segments, splitting a flattened name on the separator
        // reproduces the original nesting path.
        let schema = vec![Property::nested(
            "a",
            vec![Property::nested(
                "b",
                vec![Property::primitive("c", ValueType::Int)],
            )],
        )];
        let columns = flatten_schema(&schema).unwrap();
        assert_eq!(columns.len(), 1);
        let path: Vec<&str> = columns[0].name.split('_').collect();
        assert_eq!(path, ["a", "b", "c"]);
    }

    #[test]
    fn lists_flatten_to_a_single_text_column() {
        let schema = vec![Property::list("tags", ValueType::Text)];
        let columns = flatten_schema(&schema).unwrap();
        assert_eq!(columns, vec![FlatColumn { name: "tags".into(), ty: ValueType::Text }]);
    }

    #[test]
    fn rejects_unsafe_property_names() {
        let schema = vec![Property::primitive("bad name", ValueType::Int)];
        assert!(flatten_schema(&schema).is_err());

        let schema = vec![Property::nested(
            "outer",
            vec![Property::primitive("inner\"", ValueType::Int)],
        )];
        assert!(flatten_schema(&schema).is_err());
    }

    #[test]
    fn record_walk_matches_schema_walk() {
        let event = Event::new().with("name", "a").with(
            "location",
            Event::new().with("lat", 1.0).with("lon", 2.0),
        );

        let mut seen = Vec::new();
        visit_event(&event, &mut |name, value| {
            seen.push((name, value.clone()));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                ("name".to_string(), Value::Text("a".into())),
                ("location_lat".to_string(), Value::Double(1.0)),
                ("location_lon".to_string(), Value::Double(2.0)),
            ]
        );
    }

    #[test]
    fn record_walk_rejects_unsafe_field_names() {
        let event = Event::new().with("a;b", 1);
        assert!(visit_event(&event, &mut |_, _| Ok(())).is_err());
    }
}
