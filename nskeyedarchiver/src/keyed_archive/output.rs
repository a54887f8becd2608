/*!
 Renders unarchived data as JSON or as a plain `plist` for inspection.

 Neither format is an archive: references are already resolved and class
 information is dropped, so the output cannot be unarchived again.
*/

use std::time::SystemTime;

use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::SecondsFormat;
use json::{object::Object, JsonValue};
use plist::{Dictionary, Value};

use crate::{error::archive::ArchiveError, keyed_archive::models::Unarchived};

impl Unarchived {
    /// Convert to JSON. Data is encoded as standard base64, and dates as RFC 3339 strings
    /// with millisecond precision.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Unarchived::Boolean(boolean) => JsonValue::Boolean(*boolean),
            Unarchived::SignedInteger(int) => (*int).into(),
            Unarchived::UnsignedInteger(int) => (*int).into(),
            Unarchived::Real(real) => (*real).into(),
            Unarchived::String(string) => string.as_str().into(),
            Unarchived::Data(data) => BASE64_STANDARD.encode(data).into(),
            Unarchived::Date(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true).into(),
            Unarchived::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Unarchived::Dictionary(map) | Unarchived::Object { fields: map, .. } => {
                let mut object = Object::with_capacity(map.len());
                for (key, value) in map {
                    object.insert(key, value.to_json());
                }
                JsonValue::Object(object)
            }
        }
    }

    /// Convert to a plain [`plist::Value`]
    pub fn to_plist(&self) -> Value {
        match self {
            Unarchived::Boolean(boolean) => Value::Boolean(*boolean),
            Unarchived::SignedInteger(int) => Value::Integer((*int).into()),
            Unarchived::UnsignedInteger(int) => Value::Integer((*int).into()),
            Unarchived::Real(real) => Value::Real(*real),
            Unarchived::String(string) => Value::String(string.clone()),
            Unarchived::Data(data) => Value::Data(data.clone()),
            Unarchived::Date(date) => Value::Date(SystemTime::from(*date).into()),
            Unarchived::Array(items) => Value::Array(items.iter().map(Self::to_plist).collect()),
            Unarchived::Dictionary(map) | Unarchived::Object { fields: map, .. } => {
                Value::Dictionary(
                    map.iter()
                        .map(|(key, value)| (key.clone(), value.to_plist()))
                        .collect::<Dictionary>(),
                )
            }
        }
    }
}

/// Render a sequence of unarchived objects as a JSON array
///
/// # Example:
///
/// ```
/// use nskeyedarchiver::keyed_archive::{models::Unarchived, output::to_json};
///
/// let items = vec![Unarchived::Boolean(true), Unarchived::Data(b"hi".to_vec())];
/// assert_eq!(to_json(&items).dump(), r#"[true,"aGk="]"#);
/// ```
pub fn to_json(items: &[Unarchived]) -> JsonValue {
    JsonValue::Array(items.iter().map(Unarchived::to_json).collect())
}

/// Render a sequence of unarchived objects as an XML `plist` array
pub fn to_plist_xml(items: &[Unarchived]) -> Result<String, ArchiveError> {
    let mut buf = vec![];
    Value::Array(items.iter().map(Unarchived::to_plist).collect())
        .to_writer_xml(&mut buf)
        .map_err(ArchiveError::Plist)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
