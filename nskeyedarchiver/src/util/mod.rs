/*!
 This module defines common utilities used while unarchiving.
*/

pub mod dates;
pub mod plist;
