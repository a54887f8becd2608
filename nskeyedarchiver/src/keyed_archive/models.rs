/*!
 Data structures produced when unarchiving `NSKeyedArchiver` data.
*/

use std::{collections::BTreeMap, time::SystemTime};

use chrono::{DateTime, Utc};
use plist::{Dictionary, Value};

use crate::{
    error::{archive::ArchiveError, plist::PlistParseError},
    util::plist::{as_uid, type_name},
};

/// Classes decoded as an ordered sequence; sets keep their archived order
const COLLECTION_CLASSES: [&str; 4] = ["NSArray", "NSMutableArray", "NSSet", "NSMutableSet"];
/// Classes decoded as a string keyed mapping
///
/// `NSMutableArray` is listed here as well as in [`COLLECTION_CLASSES`]. Collections are
/// checked first, so it is always decoded as a sequence.
const DICTIONARY_CLASSES: [&str; 3] = ["NSDictionary", "NSMutableDictionary", "NSMutableArray"];

/// Rust structures containing data stored in a keyed archive
#[derive(Debug, Clone, PartialEq)]
pub enum Unarchived {
    Boolean(bool),
    /// Integers that fit in an [`i64`]
    SignedInteger(i64),
    /// Integers too large for an [`i64`]
    UnsignedInteger(u64),
    Real(f64),
    String(String),
    /// Raw bytes, i.e. an archived `NSData`
    Data(Vec<u8>),
    /// An `NSDate`, converted from the Core Data epoch
    Date(DateTime<Utc>),
    /// An `NSArray`, `NSSet`, or one of their mutable variants
    Array(Vec<Unarchived>),
    /// An `NSDictionary` or `NSMutableDictionary`
    Dictionary(BTreeMap<String, Unarchived>),
    /// An instance of any other class, represented by its encoded fields
    Object {
        /// The name of the class, if it could be resolved
        class: Option<String>,
        /// The fields the class encoded, without the `$class` reference
        fields: BTreeMap<String, Unarchived>,
    },
}

impl Unarchived {
    pub(crate) fn from_integer(int: &plist::Integer) -> Self {
        match int.as_signed() {
            Some(signed) => Self::SignedInteger(signed),
            None => Self::UnsignedInteger(int.as_unsigned().unwrap_or_default()),
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(boolean) => Some(*boolean),
            _ => None,
        }
    }

    pub fn as_signed_integer(&self) -> Option<i64> {
        match self {
            Self::SignedInteger(int) => Some(*int),
            Self::UnsignedInteger(int) => i64::try_from(*int).ok(),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(real) => Some(*real),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Unarchived]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The key/value mapping of a dictionary, or the fields of an object
    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, Unarchived>> {
        match self {
            Self::Dictionary(map) | Self::Object { fields: map, .. } => Some(map),
            _ => None,
        }
    }

    /// Look up a key in a dictionary or a field on an object
    pub fn get(&self, key: &str) -> Option<&Unarchived> {
        self.as_dictionary().and_then(|map| map.get(key))
    }

    /// The resolved class name of a generic object
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object { class, .. } => class.as_deref(),
            _ => None,
        }
    }
}

/// The ways an archived object can be rebuilt, selected by its class name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `NSDate`, read from `NS.time`
    Date,
    /// `NSMutableString`, read from `NS.string`
    String,
    /// Arrays and sets, read from `NS.objects`
    Collection,
    /// Dictionaries, read from paired `NS.keys` and `NS.objects`
    Dictionary,
    /// Every other class, read field by field
    Object,
}

impl Rule {
    /// Select a rule for a class name; the first match wins
    pub fn from_class_name(name: &str) -> Self {
        if name == "NSDate" {
            Self::Date
        } else if name == "NSMutableString" {
            Self::String
        } else if COLLECTION_CLASSES.contains(&name) {
            Self::Collection
        } else if DICTIONARY_CLASSES.contains(&name) {
            Self::Dictionary
        } else {
            Self::Object
        }
    }
}

/// A raw `plist` value, sorted by how the archive uses it
#[derive(Debug)]
pub(crate) enum Entry<'a> {
    /// Data that is copied into the output as-is
    Primitive(Unarchived),
    /// An index into the object table
    Reference(usize),
    /// An archived object, described by a `$class` and its encoded fields
    Composite(&'a Dictionary),
    /// An inline array, i.e. the `NS.objects` list of an unknown collection class
    List(&'a [Value]),
}

impl<'a> Entry<'a> {
    pub(crate) fn from_value(value: &'a Value) -> Result<Self, ArchiveError> {
        if let Some(idx) = as_uid(value) {
            return Ok(Self::Reference(idx));
        }
        Ok(match value {
            Value::Boolean(boolean) => Self::Primitive(Unarchived::Boolean(*boolean)),
            Value::Integer(int) => Self::Primitive(Unarchived::from_integer(int)),
            Value::Real(real) => Self::Primitive(Unarchived::Real(*real)),
            Value::String(string) => Self::Primitive(Unarchived::String(string.clone())),
            Value::Data(data) => Self::Primitive(Unarchived::Data(data.clone())),
            Value::Date(date) => {
                Self::Primitive(Unarchived::Date(DateTime::from(SystemTime::from(*date))))
            }
            Value::Dictionary(dict) => Self::Composite(dict),
            Value::Array(items) => Self::List(items),
            other => {
                return Err(ArchiveError::InvalidShape(PlistParseError::InvalidType(
                    type_name(other).to_string(),
                    "plist value".to_string(),
                )))
            }
        })
    }
}
