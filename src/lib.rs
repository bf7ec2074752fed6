#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors reported by the error-aggregating traversals.
///
/// This module provides [`CompositeError`], an ordered bundle of callback
/// failures, and [`SuppressedError`], which reports either a lone failure or
/// such a bundle.
pub mod error;

pub mod hash_table;

/// A hash set implementation using open addressing with backward-shift
/// deletion.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a small set interface with configurable hashers.
pub mod hash_set;

pub use error::CompositeError;
pub use error::SuppressedError;
pub use hash_set::HashSet;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashSet`] when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashSet`] when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder used when neither `foldhash` nor `std` is enabled; it
        /// cannot be constructed, so a hasher must be supplied explicitly.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
