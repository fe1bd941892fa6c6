//! Canonical JSON encoding
//!
//! Content addresses and signatures are computed over this encoding, so it
//! must be byte-identical for equal logical values:
//!
//! - object keys sorted by byte order
//! - no insignificant whitespace
//! - strings escaped exactly as `serde_json` escapes them
//! - integers in plain decimal; non-integral numbers are rejected
//! - `None` fields are left out by the record types, never rendered as `null`

use crate::errors::{Result, WaybillError};
use serde::Serialize;
use serde_json::Value;

/// Serialize any serde-compatible value to canonical JSON bytes
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value)?;
    let mut out = Vec::with_capacity(128);
    write_value(&value, &mut out)?;
    Ok(out)
}

/// Serialize any serde-compatible value to a canonical JSON string
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = to_canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| WaybillError::serialization(e.to_string()))
}

/// Canonically serialize a record with one top-level field removed
///
/// Used for content addresses, which hash a record minus its own `hashId`.
pub fn to_canonical_bytes_without<T: Serialize + ?Sized>(
    value: &T,
    omitted_field: &str,
) -> Result<Vec<u8>> {
    let mut value = serde_json::to_value(value)?;
    match value.as_object_mut() {
        Some(object) => {
            object.remove(omitted_field);
        }
        None => {
            return Err(WaybillError::serialization(format!(
                "cannot omit field {omitted_field:?} from a non-object value"
            )))
        }
    }
    let mut out = Vec::with_capacity(128);
    write_value(&value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                out.extend_from_slice(n.to_string().as_bytes());
            } else if let Some(n) = number.as_u64() {
                out.extend_from_slice(n.to_string().as_bytes());
            } else {
                return Err(WaybillError::serialization(format!(
                    "non-integral number {number} has no canonical form"
                )));
            }
        }
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(object) => {
            let mut entries: Vec<(&String, &Value)> = object.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out)?;
                out.push(b':');
                write_value(item, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut Vec<u8>) -> Result<()> {
    serde_json::to_writer(&mut *out, s)?;
    Ok(())
}
