/*!
 Helpers for reading typed values out of a decoded [`plist::Value`].

 Each helper reports what it expected to find so callers can surface
 the shape of a malformed archive instead of panicking on it.
*/

use plist::{Dictionary, Value};

use crate::error::plist::PlistParseError;

/// The key XML plists use to encode a UID as a single-entry dictionary
pub const UID_KEY: &str = "CF$UID";

/// Interpret a value as a [`Dictionary`]
pub fn plist_as_dictionary(plist: &Value) -> Result<&Dictionary, PlistParseError> {
    plist
        .as_dictionary()
        .ok_or_else(|| PlistParseError::InvalidType("root".to_string(), "dictionary".to_string()))
}

/// Extract a dictionary stored under `key`
pub fn extract_dictionary<'a>(
    body: &'a Dictionary,
    key: &str,
) -> Result<&'a Dictionary, PlistParseError> {
    body.get(key)
        .ok_or_else(|| PlistParseError::MissingKey(key.to_string()))?
        .as_dictionary()
        .ok_or_else(|| PlistParseError::InvalidType(key.to_string(), "dictionary".to_string()))
}

/// Extract an array stored under `key`
pub fn extract_array_key<'a>(
    body: &'a Dictionary,
    key: &str,
) -> Result<&'a Vec<Value>, PlistParseError> {
    body.get(key)
        .ok_or_else(|| PlistParseError::MissingKey(key.to_string()))?
        .as_array()
        .ok_or_else(|| PlistParseError::InvalidType(key.to_string(), "array".to_string()))
}

/// Extract a string stored under `key`
pub fn extract_string_key<'a>(body: &'a Dictionary, key: &str) -> Result<&'a str, PlistParseError> {
    body.get(key)
        .ok_or_else(|| PlistParseError::MissingKey(key.to_string()))?
        .as_string()
        .ok_or_else(|| PlistParseError::InvalidType(key.to_string(), "string".to_string()))
}

/// Extract a number stored under `key` as a double, accepting integers as well as reals
pub fn extract_real_key(body: &Dictionary, key: &str) -> Result<f64, PlistParseError> {
    let value = body
        .get(key)
        .ok_or_else(|| PlistParseError::MissingKey(key.to_string()))?;
    value
        .as_real()
        .or_else(|| value.as_signed_integer().map(|int| int as f64))
        .ok_or_else(|| PlistParseError::InvalidType(key.to_string(), "real".to_string()))
}

/// Read a value as an index into an archive's object table.
///
/// Binary plists store these as [`Value::Uid`], XML plists as a
/// dictionary with a single [`UID_KEY`] integer.
pub fn as_uid(value: &Value) -> Option<usize> {
    match value {
        Value::Uid(uid) => usize::try_from(uid.get()).ok(),
        Value::Dictionary(dict) if dict.len() == 1 => dict
            .get(UID_KEY)
            .and_then(Value::as_unsigned_integer)
            .and_then(|uid| usize::try_from(uid).ok()),
        _ => None,
    }
}

/// Extract an array of UIDs stored under `key`
pub fn extract_uid_list(body: &Dictionary, key: &str) -> Result<Vec<usize>, PlistParseError> {
    extract_array_key(body, key)?
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            as_uid(item).ok_or_else(|| PlistParseError::InvalidTypeIndex(idx, "uid".to_string()))
        })
        .collect()
}

/// A short, human readable name for the kind of data a value holds
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Dictionary(_) => "dictionary",
        Value::Boolean(_) => "boolean",
        Value::Data(_) => "data",
        Value::Date(_) => "date",
        Value::Real(_) => "real",
        Value::Integer(_) => "integer",
        Value::String(_) => "string",
        Value::Uid(_) => "uid",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use plist::{Dictionary, Uid, Value};

    use crate::{
        error::plist::PlistParseError,
        util::plist::{
            as_uid, extract_real_key, extract_string_key, extract_uid_list, plist_as_dictionary,
            UID_KEY,
        },
    };

    fn xml_uid(idx: u64) -> Value {
        let mut dict = Dictionary::new();
        dict.insert(UID_KEY.to_string(), Value::Integer(idx.into()));
        Value::Dictionary(dict)
    }

    #[test]
    fn can_read_binary_uid() {
        assert_eq!(as_uid(&Value::Uid(Uid::new(7))), Some(7));
    }

    #[test]
    fn can_read_xml_uid() {
        assert_eq!(as_uid(&xml_uid(12)), Some(12));
    }

    #[test]
    fn cant_read_uid_from_other_values() {
        assert_eq!(as_uid(&Value::Integer(3.into())), None);
        assert_eq!(as_uid(&Value::String("3".to_string())), None);

        let mut dict = Dictionary::new();
        dict.insert(UID_KEY.to_string(), Value::Integer(1.into()));
        dict.insert("other".to_string(), Value::Boolean(true));
        assert_eq!(as_uid(&Value::Dictionary(dict)), None);
    }

    #[test]
    fn can_extract_uid_list() {
        let mut body = Dictionary::new();
        body.insert(
            "NS.objects".to_string(),
            Value::Array(vec![Value::Uid(Uid::new(1)), xml_uid(4)]),
        );

        assert_eq!(extract_uid_list(&body, "NS.objects").unwrap(), vec![1, 4]);
    }

    #[test]
    fn cant_extract_uid_list_with_primitive() {
        let mut body = Dictionary::new();
        body.insert(
            "NS.objects".to_string(),
            Value::Array(vec![Value::Uid(Uid::new(1)), Value::Boolean(true)]),
        );

        assert_eq!(
            extract_uid_list(&body, "NS.objects"),
            Err(PlistParseError::InvalidTypeIndex(1, "uid".to_string()))
        );
    }

    #[test]
    fn can_report_missing_and_mistyped_keys() {
        let mut body = Dictionary::new();
        body.insert("root".to_string(), Value::Boolean(false));

        assert_eq!(
            extract_string_key(&body, "missing"),
            Err(PlistParseError::MissingKey("missing".to_string()))
        );
        assert_eq!(
            extract_string_key(&body, "root"),
            Err(PlistParseError::InvalidType(
                "root".to_string(),
                "string".to_string()
            ))
        );
        assert!(plist_as_dictionary(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn can_extract_real_from_integer() {
        let mut body = Dictionary::new();
        body.insert("NS.time".to_string(), Value::Integer(10.into()));

        assert_eq!(extract_real_key(&body, "NS.time").unwrap(), 10.0);
    }
}
