//! Generic nested data access: wildcard paths, scoped multiplication and
//! restoration of pristine values.

pub mod data;
pub mod path;

pub use data::{DataTree, GetOptions};
pub use path::{Segment, TreePath};
