use super::{Formatter, ToSql};

use rowsink_core::config::DbEngine;
use rowsink_core::schema::ValueType;

/// Collects the positional parameters produced while serializing an INSERT
/// template.
pub trait Params {
    /// Registers a parameter slot for `column` and returns its 1-based
    /// placeholder.
    fn push(&mut self, column: &str, ty: ValueType) -> Placeholder;
}

pub struct Placeholder(pub usize);

impl Params for Vec<(String, ValueType)> {
    fn push(&mut self, column: &str, ty: ValueType) -> Placeholder {
        self.push((column.to_string(), ty));
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        use std::fmt::Write;

        match f.serializer.dialect.engine() {
            DbEngine::MySql => write!(f.dst, "?").unwrap(),
            DbEngine::PostgreSql => write!(f.dst, "${}", self.0).unwrap(),
        }
    }
}
