//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeSet;

/// SmallVec sized for per-category method votes (at most 3 methods).
pub type SmallVec3<T> = SmallVec<[T; 3]>;
