use super::{Comma, Ident, Params, ToSql};

use crate::stmt::{CreateDatabase, CreateTable, Insert, Statement};

use rowsink_core::flatten::FlatColumn;

impl ToSql for &Statement<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Statement::CreateDatabase(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &CreateDatabase<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let name = Ident(self.name);

        fmt!(f, "CREATE DATABASE " name);
    }
}

/// A column definition within CREATE TABLE: name plus dialect-mapped type.
struct ColumnDef<'a>(&'a FlatColumn);

impl ToSql for ColumnDef<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let name = Ident(self.0.name.as_str());
        let ty = f.serializer.dialect.column_type(self.0.ty);

        fmt!(f, name " " ty);
    }
}

impl ToSql for &CreateTable<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let name = Ident(self.name);
        let columns = Comma(self.columns.iter().map(ColumnDef));

        fmt!(f, "CREATE TABLE " name " (" columns ")");
    }
}

impl ToSql for &Insert<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table = Ident(self.table);
        let columns = Comma(self.columns.iter().map(|c| Ident(c.name.as_str())));

        fmt!(f, "INSERT INTO " table " (" columns ") VALUES (");

        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                fmt!(f, ", ");
            }
            let placeholder = f.params.push(&column.name, column.ty);
            placeholder.to_sql(f);
        }

        fmt!(f, ")");
    }
}
