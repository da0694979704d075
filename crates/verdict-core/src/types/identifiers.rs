//! Canonical row identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::SYNTHETIC_ID_PREFIX;

/// Zero-based position of a row in the source table.
///
/// Every sample, matrix and detection result refers to rows through this
/// one identifier space, no matter how the rows were filtered on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

impl RowId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Synthetic observation identifier used when no subject-id column is configured.
    pub fn synthetic_label(self) -> String {
        format!("{SYNTHETIC_ID_PREFIX}{}", self.0)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RowId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_label_uses_prefix() {
        assert_eq!(RowId(7).synthetic_label(), "obs_7");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&RowId(3)).unwrap();
        assert_eq!(json, "3");
    }
}
