use rowsink_core::event::Value as CoreValue;
use tokio_postgres::types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type};

/// Adapts an engine value to the parameter type PostgreSQL inferred for the
/// prepared statement's placeholder.
///
/// The statement is prepared without explicit parameter types, so the server
/// derives each placeholder's type from the target column. The bound value's
/// runtime type may be narrower or wider than that; numeric values widen or
/// narrow to the column type, and any scalar degrades to its text rendering
/// when the column stores text.
#[derive(Debug)]
pub(crate) struct PgValue<'a>(pub(crate) &'a CoreValue);

type ToSqlResult = Result<IsNull, Box<dyn std::error::Error + Sync + Send>>;

impl ToSql for PgValue<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> ToSqlResult {
        match self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => match *ty {
                Type::BOOL => value.to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => Err(mismatch("boolean", ty)),
            },
            CoreValue::Int(value) => match *ty {
                Type::INT2 => (*value as i16).to_sql(ty, out),
                Type::INT4 => value.to_sql(ty, out),
                Type::INT8 => (*value as i64).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => Err(mismatch("integer", ty)),
            },
            CoreValue::BigInt(value) | CoreValue::Timestamp(value) => match *ty {
                Type::INT8 => value.to_sql(ty, out),
                Type::INT4 => (*value as i32).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => Err(mismatch("bigint", ty)),
            },
            CoreValue::Float(value) => match *ty {
                Type::FLOAT4 => value.to_sql(ty, out),
                Type::FLOAT8 => (*value as f64).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => Err(mismatch("float", ty)),
            },
            CoreValue::Double(value) => match *ty {
                Type::FLOAT8 => value.to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => Err(mismatch("double", ty)),
            },
            CoreValue::Text(value) => value.to_sql(ty, out),
            // The engine flattens records and collapses lists to text before
            // binding; reaching here is an engine bug.
            CoreValue::Nested(_) | CoreValue::List(_) => {
                Err("nested values cannot be bound as parameters".into())
            }
        }
    }

    fn accepts(_: &Type) -> bool {
        // Per-variant coercion above decides what actually fits.
        true
    }

    to_sql_checked!();
}

fn mismatch(value: &str, ty: &Type) -> Box<dyn std::error::Error + Sync + Send> {
    format!("cannot bind a {value} value to a column of type {ty}").into()
}
