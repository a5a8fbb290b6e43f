use rowsink_core::client::ClientError;
use rowsink_core::event::Value as CoreValue;

/// Maps an engine value onto a MySQL wire value.
///
/// Booleans travel as integers, which is how MySQL stores its BOOLEAN
/// columns; timestamps are epoch milliseconds and travel as BIGINT.
pub(crate) fn to_mysql(value: &CoreValue) -> Result<mysql_async::Value, ClientError> {
    Ok(match value {
        CoreValue::Bool(v) => mysql_async::Value::from(*v),
        CoreValue::Int(v) => mysql_async::Value::from(*v),
        CoreValue::BigInt(v) | CoreValue::Timestamp(v) => mysql_async::Value::from(*v),
        CoreValue::Float(v) => mysql_async::Value::from(*v),
        CoreValue::Double(v) => mysql_async::Value::from(*v),
        CoreValue::Text(v) => mysql_async::Value::from(v.as_str()),
        CoreValue::Null => mysql_async::Value::NULL,
        // The engine flattens records and collapses lists to text before
        // binding; reaching here is an engine bug.
        CoreValue::Nested(_) | CoreValue::List(_) => {
            return Err(ClientError::new(
                "nested values cannot be bound as parameters",
            ));
        }
    })
}
