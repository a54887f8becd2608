/*!
 Errors that can happen when reading values out of a decoded `plist`.
*/

use std::fmt::{Display, Formatter, Result};

/// Errors that can happen when reading values out of a decoded `plist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistParseError {
    MissingKey(String),
    InvalidType(String, String),
    InvalidTypeIndex(usize, String),
}

impl Display for PlistParseError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            PlistParseError::MissingKey(key) => write!(fmt, "Expected key {key}, found nothing!"),
            PlistParseError::InvalidType(key, value) => {
                write!(fmt, "Invalid data found at {key}, expected {value}")
            }
            PlistParseError::InvalidTypeIndex(idx, value) => {
                write!(fmt, "Invalid data found at object index {idx}, expected {value}")
            }
        }
    }
}

impl std::error::Error for PlistParseError {}
