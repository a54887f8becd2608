#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod keyed_archive;
pub mod util;

pub use error::archive::ArchiveError;
pub use keyed_archive::{
    models::Unarchived,
    unarchiver::{unarchive, unarchive_value, UnarchiveOptions, Unarchiver},
};
