/*!
 Contains logic to rebuild the object graph stored in an `NSKeyedArchiver` archive.

 Objects in the archive are flattened into a table, `$objects`, and refer to each other by
 their index in that table. Starting from the references stored in `$top`, each reference
 is followed and the object it points to is rebuilt according to its class:

 - Primitives (booleans, numbers, strings, and data) are copied as-is
 - `NSDate` becomes a [`DateTime`](chrono::DateTime)
 - `NSMutableString` becomes a [`String`]
 - `NSArray`, `NSSet`, and their mutable variants become an ordered sequence
 - `NSDictionary` and `NSMutableDictionary` become a string keyed mapping
 - Anything else becomes an object holding its encoded fields

 Repeated references are rebuilt each time they are seen.
*/

use std::{
    collections::{BTreeMap, HashSet},
    io::Cursor,
};

use plist::{Dictionary, Value};
use tracing::{debug, trace};

use crate::{
    error::{archive::ArchiveError, plist::PlistParseError},
    keyed_archive::{
        models::{Entry, Rule, Unarchived},
        validator::{top_references, validate, OBJECTS_KEY, TOP_KEY},
    },
    util::{
        dates::from_core_data,
        plist::{
            as_uid, extract_array_key, extract_dictionary, extract_real_key, extract_string_key,
            extract_uid_list, plist_as_dictionary, type_name,
        },
    },
};

/// The default limit on how deeply archived objects may nest
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Field on an archived object holding a reference to its class description
const CLASS_KEY: &str = "$class";
/// Field on a class description listing its inheritance chain
const CLASSES_KEY: &str = "$classes";
/// Field on a class description holding the class name
const CLASSNAME_KEY: &str = "$classname";
/// Field holding the seconds since the Core Data epoch of an `NSDate`
const TIME_KEY: &str = "NS.time";
/// Field holding the text of an `NSMutableString`
const STRING_KEY: &str = "NS.string";
/// Field holding the items of a collection, or the values of a dictionary
const ITEMS_KEY: &str = "NS.objects";
/// Field holding the keys of a dictionary
const KEYS_KEY: &str = "NS.keys";

/// Settings that control how an archive is unarchived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnarchiveOptions {
    /// How many archived objects may be nested inside each other before giving up, or [`None`] for no limit
    pub max_depth: Option<usize>,
    /// Whether to report an object that contains itself as an error instead of recursing until the stack runs out
    pub detect_cycles: bool,
}

impl Default for UnarchiveOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            detect_cycles: true,
        }
    }
}

impl UnarchiveOptions {
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }
}

/// Decodes keyed archives with a given set of [`UnarchiveOptions`]
#[derive(Debug, Default, Clone)]
pub struct Unarchiver {
    options: UnarchiveOptions,
}

impl Unarchiver {
    pub fn new(options: UnarchiveOptions) -> Self {
        Self { options }
    }

    /// Decode an XML or binary `plist` and rebuild the objects it archives
    ///
    /// # Example:
    ///
    /// ```no_run
    /// use nskeyedarchiver::keyed_archive::unarchiver::Unarchiver;
    ///
    /// let bytes = std::fs::read("archive.plist").unwrap();
    /// let objects = Unarchiver::default().unarchive(&bytes).unwrap();
    /// ```
    pub fn unarchive(&self, bytes: &[u8]) -> Result<Vec<Unarchived>, ArchiveError> {
        let plist = Value::from_reader(Cursor::new(bytes)).map_err(ArchiveError::Plist)?;
        self.unarchive_value(&plist)
    }

    /// Rebuild the objects archived in an already decoded `plist`
    pub fn unarchive_value(&self, plist: &Value) -> Result<Vec<Unarchived>, ArchiveError> {
        let archive = plist_as_dictionary(plist).map_err(ArchiveError::InvalidShape)?;
        validate(archive)?;

        let top = extract_dictionary(archive, TOP_KEY).map_err(ArchiveError::InvalidShape)?;
        let objects = extract_array_key(archive, OBJECTS_KEY).map_err(ArchiveError::InvalidShape)?;

        let references = top_references(top)?;
        ObjectWalker::new(objects, &self.options).extract_objects(&references)
    }
}

/// Decode an XML or binary `plist` with the default [`UnarchiveOptions`]
pub fn unarchive(bytes: &[u8]) -> Result<Vec<Unarchived>, ArchiveError> {
    Unarchiver::default().unarchive(bytes)
}

/// Rebuild the objects archived in a decoded `plist` with the default [`UnarchiveOptions`]
pub fn unarchive_value(plist: &Value) -> Result<Vec<Unarchived>, ArchiveError> {
    Unarchiver::default().unarchive_value(plist)
}

/// Get the class name of an archived object from the value of its `$class` field
///
/// Anything that does not lead to a class description with a `$classname`
/// is an [`ArchiveError::UnresolvedClass`]. A reference outside of the object
/// table is an [`ArchiveError::OutOfBounds`].
pub(crate) fn resolve_class<'a>(
    class: Option<&Value>,
    objects: &'a [Value],
) -> Result<&'a str, ArchiveError> {
    let class = class.ok_or_else(|| ArchiveError::UnresolvedClass(format!("no {CLASS_KEY} field")))?;
    let idx = as_uid(class).ok_or_else(|| {
        ArchiveError::UnresolvedClass(format!("{} is not a reference", type_name(class)))
    })?;
    objects
        .get(idx)
        .ok_or(ArchiveError::OutOfBounds(idx, objects.len()))?
        .as_dictionary()
        .ok_or_else(|| ArchiveError::UnresolvedClass(format!("object {idx} is not a class")))
        .and_then(|description| {
            extract_string_key(description, CLASSNAME_KEY)
                .map_err(|why| ArchiveError::UnresolvedClass(why.to_string()))
        })
}

/// Follows references through the object table of a single archive
struct ObjectWalker<'a> {
    /// The archive's `$objects` table
    objects: &'a [Value],
    options: &'a UnarchiveOptions,
    /// Table indexes of the objects currently being rebuilt
    in_progress: HashSet<usize>,
    /// How many objects are currently being rebuilt
    depth: usize,
}

impl<'a> ObjectWalker<'a> {
    fn new(objects: &'a [Value], options: &'a UnarchiveOptions) -> Self {
        Self {
            objects,
            options,
            in_progress: HashSet::new(),
            depth: 0,
        }
    }

    /// Rebuild the objects at each table index, in order
    fn extract_objects(&mut self, references: &[usize]) -> Result<Vec<Unarchived>, ArchiveError> {
        debug!(
            "Extracting {} objects from list of {} total objects",
            references.len(),
            self.objects.len()
        );
        references.iter().map(|idx| self.resolve(*idx)).collect()
    }

    /// Rebuild the object at a table index
    fn resolve(&mut self, idx: usize) -> Result<Unarchived, ArchiveError> {
        let objects = self.objects;
        let value = objects
            .get(idx)
            .ok_or(ArchiveError::OutOfBounds(idx, objects.len()))?;

        match Entry::from_value(value)? {
            Entry::Primitive(primitive) => Ok(primitive),
            Entry::Composite(object) => self.enter(idx, object),
            Entry::Reference(_) | Entry::List(_) => Err(ArchiveError::InvalidShape(
                PlistParseError::InvalidTypeIndex(idx, "primitive or object".to_string()),
            )),
        }
    }

    /// Guard against cycles and runaway nesting while rebuilding a composite object
    fn enter(&mut self, idx: usize, object: &'a Dictionary) -> Result<Unarchived, ArchiveError> {
        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                return Err(ArchiveError::DepthExceeded(limit));
            }
        }
        if self.options.detect_cycles && !self.in_progress.insert(idx) {
            return Err(ArchiveError::Cycle(idx));
        }

        self.depth += 1;
        let result = self.reconstruct(object);
        self.depth -= 1;
        self.in_progress.remove(&idx);

        result
    }

    /// Pick the [`Rule`] for an object; objects whose class cannot be found are read field by field
    fn classify(&self, object: &Dictionary) -> Result<(Rule, Option<&'a str>), ArchiveError> {
        match resolve_class(object.get(CLASS_KEY), self.objects) {
            Ok(name) => Ok((Rule::from_class_name(name), Some(name))),
            Err(ArchiveError::UnresolvedClass(why)) => {
                debug!("Could not find class: {why}");
                Ok((Rule::Object, None))
            }
            Err(why) => Err(why),
        }
    }

    fn reconstruct(&mut self, object: &'a Dictionary) -> Result<Unarchived, ArchiveError> {
        let (rule, class) = self.classify(object)?;
        match rule {
            Rule::Date => extract_real_key(object, TIME_KEY)
                .map_err(ArchiveError::InvalidShape)
                .and_then(from_core_data)
                .map(Unarchived::Date),
            Rule::String => extract_string_key(object, STRING_KEY)
                .map(|text| Unarchived::String(text.to_string()))
                .map_err(ArchiveError::InvalidShape),
            Rule::Collection => self.extract_collection(object),
            Rule::Dictionary => self.extract_dictionary(object),
            Rule::Object => self.extract_custom_object(object, class),
        }
    }

    /// Arrays and sets store their items as a list of references
    fn extract_collection(&mut self, object: &Dictionary) -> Result<Unarchived, ArchiveError> {
        let references = extract_uid_list(object, ITEMS_KEY).map_err(ArchiveError::InvalidShape)?;
        self.extract_objects(&references).map(Unarchived::Array)
    }

    /// Dictionaries store parallel lists of key and value references
    fn extract_dictionary(&mut self, object: &Dictionary) -> Result<Unarchived, ArchiveError> {
        let key_references =
            extract_uid_list(object, KEYS_KEY).map_err(ArchiveError::InvalidShape)?;
        let value_references =
            extract_uid_list(object, ITEMS_KEY).map_err(ArchiveError::InvalidShape)?;
        if key_references.len() != value_references.len() {
            return Err(ArchiveError::MismatchedLength(
                key_references.len(),
                value_references.len(),
            ));
        }

        let keys = self.extract_objects(&key_references)?;
        let values = self.extract_objects(&value_references)?;

        keys.into_iter()
            .zip(values)
            .enumerate()
            .map(|(idx, (key, value))| match key {
                Unarchived::String(key) => Ok((key, value)),
                _ => Err(ArchiveError::KeyNotString(idx)),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Unarchived::Dictionary)
    }

    /// Any other class stores its fields directly on the object, either inline or as references
    ///
    /// ```txt
    /// "$class" => <CFKeyedArchiverUID>{value = 56}
    /// "albumGUID" => <CFKeyedArchiverUID>{value = 4}
    /// "count" => 3
    /// ```
    fn extract_custom_object(
        &mut self,
        object: &'a Dictionary,
        class: Option<&str>,
    ) -> Result<Unarchived, ArchiveError> {
        let mut fields = BTreeMap::new();
        let mut names = vec![];
        let mut references = vec![];

        for (key, value) in object.iter() {
            if key == CLASS_KEY || key == CLASSES_KEY {
                trace!("Ignoring class definition {key}");
                continue;
            }
            match Entry::from_value(value)? {
                Entry::Primitive(primitive) => {
                    trace!("Adding primitive directly {key}: {primitive:?}");
                    fields.insert(key.clone(), primitive);
                }
                Entry::Reference(idx) => {
                    names.push(key.clone());
                    references.push(idx);
                }
                Entry::List(_) | Entry::Composite(_) => {
                    fields.insert(key.clone(), self.resolve_inline(value)?);
                }
            }
        }

        let values = self.extract_objects(&references)?;
        fields.extend(names.into_iter().zip(values));

        Ok(Unarchived::Object {
            class: class.map(String::from),
            fields,
        })
    }

    /// Rebuild a field value that is not a table slot, i.e. an inline list of references
    fn resolve_inline(&mut self, value: &'a Value) -> Result<Unarchived, ArchiveError> {
        match Entry::from_value(value)? {
            Entry::Primitive(primitive) => Ok(primitive),
            Entry::Reference(idx) => self.resolve(idx),
            Entry::List(items) => items
                .iter()
                .map(|item| self.resolve_inline(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Unarchived::Array),
            Entry::Composite(dict) => dict
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.resolve_inline(item)?)))
                .collect::<Result<BTreeMap<_, _>, ArchiveError>>()
                .map(Unarchived::Dictionary),
        }
    }
}
