/*!
 Checks the header of a keyed archive and finds the objects it holds.
*/

use plist::{Dictionary, Value};

use crate::{
    error::archive::ArchiveError,
    util::plist::{as_uid, type_name},
};

/// Name of the key holding the archiver that wrote the data
pub const ARCHIVER_KEY: &str = "$archiver";
/// Name of the key holding references to the top level objects
pub const TOP_KEY: &str = "$top";
/// Name of the key holding the object table
pub const OBJECTS_KEY: &str = "$objects";
/// Name of the key holding the archive format version
pub const VERSION_KEY: &str = "$version";
/// The only archiver this crate can read
pub const ARCHIVER: &str = "NSKeyedArchiver";
/// The only archive format version this crate can read
pub const VERSION: u64 = 100_000;
/// Name of the single top level key used by `archivedData(withRootObject:)`
pub const ROOT_KEY: &str = "root";

/// Describe a value for use in an error message
fn describe(value: &Value) -> String {
    match value {
        Value::String(string) => format!("\"{string}\""),
        Value::Integer(int) => int
            .as_signed()
            .map(|signed| signed.to_string())
            .or_else(|| int.as_unsigned().map(|unsigned| unsigned.to_string()))
            .unwrap_or_default(),
        other => type_name(other).to_string(),
    }
}

/// Ensure an archive was written by `NSKeyedArchiver` and contains everything we need to read it
///
/// Checks happen in order, and the first problem found is returned.
pub fn validate(archive: &Dictionary) -> Result<(), ArchiveError> {
    let archiver = archive
        .get(ARCHIVER_KEY)
        .ok_or_else(|| ArchiveError::MissingKey(ARCHIVER_KEY.to_string()))?;
    if archiver.as_string() != Some(ARCHIVER) {
        return Err(ArchiveError::InvalidValue(
            ARCHIVER_KEY.to_string(),
            format!("\"{ARCHIVER}\""),
            describe(archiver),
        ));
    }

    for key in [TOP_KEY, OBJECTS_KEY] {
        if !archive.contains_key(key) {
            return Err(ArchiveError::MissingKey(key.to_string()));
        }
    }

    let version = archive
        .get(VERSION_KEY)
        .ok_or_else(|| ArchiveError::MissingKey(VERSION_KEY.to_string()))?;
    if version.as_unsigned_integer() != Some(VERSION) {
        return Err(ArchiveError::InvalidValue(
            VERSION_KEY.to_string(),
            VERSION.to_string(),
            describe(version),
        ));
    }

    Ok(())
}

/// Collect the object table indexes of the top level objects, in order
///
/// Archives with a single root object store it under [`ROOT_KEY`]; otherwise each
/// encoded object is stored under `$0`, `$1`, and so on.
pub fn top_references(top: &Dictionary) -> Result<Vec<usize>, ArchiveError> {
    if let Some(root) = top.get(ROOT_KEY) {
        return reference(root, ROOT_KEY).map(|idx| vec![idx]);
    }

    (0..top.len())
        .map(|idx| {
            let key = format!("${idx}");
            let value = top
                .get(&key)
                .ok_or_else(|| ArchiveError::MissingTopKey(key.clone()))?;
            reference(value, &key)
        })
        .collect()
}

fn reference(value: &Value, key: &str) -> Result<usize, ArchiveError> {
    as_uid(value).ok_or_else(|| {
        ArchiveError::InvalidValue(key.to_string(), "uid".to_string(), describe(value))
    })
}
