//! Prefix formatting: the pure Record → prefix1/prefix2/prefix3 functions
//! spec.md §4.1 describes.

pub mod prefix;

pub use prefix::{format_prefix1, format_prefix2, format_prefix3};
