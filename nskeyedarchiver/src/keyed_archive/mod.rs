/*!
 Contains logic and data structures used to decode `NSKeyedArchiver` data into native Rust data structures.

 ## Overview

 `NSKeyedArchiver` serializes a graph of `Objective-C` objects into a `plist`. Every object is
 stored once in a flat table, `$objects`, and objects refer to one another by their position
 in that table. The objects that were archived are listed in `$top`.

 ## Features

 - Reads XML and binary archives
 - No dependencies on Apple frameworks
 - Objects without special handling are decoded field by field, so no knowledge of the original class hierarchy is needed
 - Reference cycles and runaway nesting are reported as errors instead of overflowing the stack
*/

pub mod models;
pub mod output;
pub mod unarchiver;
pub mod validator;
mod tests;
