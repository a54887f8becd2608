/*!
 Errors that can happen when unarchiving `NSKeyedArchiver` data.
*/

use std::fmt::{Display, Formatter, Result};

use crate::error::plist::PlistParseError;

/// Errors that can happen when unarchiving `NSKeyedArchiver` data
#[derive(Debug)]
pub enum ArchiveError {
    /// The bytes could not be read as an XML or binary `plist`
    Plist(plist::Error),
    /// A required top-level archive key is absent
    MissingKey(String),
    /// A top-level archive key holds the wrong value: key, expected, found
    InvalidValue(String, String, String),
    /// `$top` does not contain the sequential `$n` key that its size implies
    MissingTopKey(String),
    /// A field is absent or has the wrong shape
    InvalidShape(PlistParseError),
    /// A reference points outside of the object table: index, table length
    OutOfBounds(usize, usize),
    /// The dictionary key at the given position did not resolve to a string
    KeyNotString(usize),
    /// Dictionary key and value lists differ in length: keys, values
    MismatchedLength(usize, usize),
    /// The `$class` of an object could not be resolved to a class name
    UnresolvedClass(String),
    /// The object at the given table index references itself
    Cycle(usize),
    /// Objects are nested deeper than the configured limit
    DepthExceeded(usize),
    /// A Core Data timestamp could not be represented
    InvalidTimestamp(f64),
}

impl ArchiveError {
    /// Whether the error was raised while checking the archive header, before any objects were read
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ArchiveError::MissingKey(_) | ArchiveError::InvalidValue(_, _, _)
        )
    }
}

impl Display for ArchiveError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            ArchiveError::Plist(why) => write!(fmt, "Unable to read plist: {why}"),
            ArchiveError::MissingKey(key) => {
                write!(fmt, "Invalid NSKeyedArchiver object, missing key '{key}'")
            }
            ArchiveError::InvalidValue(key, expected, found) => write!(
                fmt,
                "Invalid value {found} for key '{key}', expected {expected}"
            ),
            ArchiveError::MissingTopKey(key) => write!(fmt, "Missing top level object '{key}'"),
            ArchiveError::InvalidShape(why) => write!(fmt, "{why}"),
            ArchiveError::OutOfBounds(idx, len) => {
                write!(fmt, "Reference {idx} is outside of object table of length {len}!")
            }
            ArchiveError::KeyNotString(idx) => {
                write!(fmt, "Dictionary key at position {idx} is not a string")
            }
            ArchiveError::MismatchedLength(keys, values) => write!(
                fmt,
                "Dictionary has {keys} keys but {values} values"
            ),
            ArchiveError::UnresolvedClass(why) => write!(fmt, "Could not find class: {why}"),
            ArchiveError::Cycle(idx) => write!(fmt, "Object {idx} contains a reference to itself"),
            ArchiveError::DepthExceeded(limit) => {
                write!(fmt, "Objects are nested more than {limit} levels deep")
            }
            ArchiveError::InvalidTimestamp(timestamp) => {
                write!(fmt, "Timestamp {timestamp} is not a valid date")
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Plist(why) => Some(why),
            ArchiveError::InvalidShape(why) => Some(why),
            _ => None,
        }
    }
}
