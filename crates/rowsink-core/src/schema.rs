//! The event-schema description supplied by the enclosing sink.
//!
//! A schema is an ordered property tree. Declaration order is significant: it
//! determines column order in generated DDL and the positional parameter
//! indices of the cached INSERT template.

/// A value's logical type, independent of any SQL dialect's column type
/// spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    BigInt,
    Float,
    Double,
    Text,
    /// Epoch milliseconds.
    Timestamp,
}

/// One property of an event schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
}

/// The three shapes a property can take.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// A scalar leaf.
    Primitive(ValueType),

    /// A nested group of properties, flattened into its parent with a `_`
    /// separated name.
    Nested(Vec<Property>),

    /// A homogeneous list of scalars, stored as a single text column.
    List(ValueType),
}

impl Property {
    pub fn primitive(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Primitive(ty),
        }
    }

    pub fn nested(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Nested(properties),
        }
    }

    pub fn list(name: impl Into<String>, element: ValueType) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::List(element),
        }
    }
}

/// The ordered property tree describing the events a sink receives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventSchema {
    pub properties: Vec<Property>,
}

impl EventSchema {
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }
}
