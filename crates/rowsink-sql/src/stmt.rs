//! The statements this engine generates. Table and column names carried here
//! must already have passed the identifier guard; values are never part of a
//! statement, they are bound as parameters.

use rowsink_core::flatten::FlatColumn;

#[derive(Debug)]
pub enum Statement<'a> {
    CreateDatabase(CreateDatabase<'a>),
    CreateTable(CreateTable<'a>),
    Insert(Insert<'a>),
}

#[derive(Debug)]
pub struct CreateDatabase<'a> {
    pub name: &'a str,
}

#[derive(Debug)]
pub struct CreateTable<'a> {
    pub name: &'a str,
    pub columns: &'a [FlatColumn],
}

/// A parameterized INSERT template over a flattened column list. The column
/// types are the runtime types resolved from the record the template was
/// generated from.
#[derive(Debug)]
pub struct Insert<'a> {
    pub table: &'a str,
    pub columns: &'a [FlatColumn],
}

impl<'a> Statement<'a> {
    pub fn create_database(name: &'a str) -> Self {
        Self::CreateDatabase(CreateDatabase { name })
    }

    pub fn create_table(name: &'a str, columns: &'a [FlatColumn]) -> Self {
        Self::CreateTable(CreateTable { name, columns })
    }

    pub fn insert(table: &'a str, columns: &'a [FlatColumn]) -> Self {
        Self::Insert(Insert { table, columns })
    }
}
