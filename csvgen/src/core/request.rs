//! Shape validation for generation requests.

use serde_json::Value;

use crate::error::ValidationError;

/// Rows in submission order; the first row is written as the header.
pub type Rows = Vec<Vec<Value>>;

/// Parse a raw request body and extract its rows.
///
/// Anything that is not JSON, or is JSON without a usable `data` field, is a
/// [`ValidationError`].
pub fn rows_from_body(body: &[u8]) -> Result<Rows, ValidationError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| ValidationError)?;
    rows_from_payload(&payload)
}

/// Extract rows from a `{"data": [[...], ...]}` payload.
///
/// `data` must be a non-empty array whose first element is itself an array.
/// Later rows that are not arrays are kept as single-field rows so every
/// submitted row reaches the output in order.
pub fn rows_from_payload(payload: &Value) -> Result<Rows, ValidationError> {
    let data = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or(ValidationError)?;

    match data.first() {
        Some(Value::Array(_)) => {}
        _ => return Err(ValidationError),
    }

    Ok(data
        .iter()
        .map(|row| match row {
            Value::Array(fields) => fields.clone(),
            other => vec![other.clone()],
        })
        .collect())
}
