//! Brand domain entity.

use serde::{Deserialize, Serialize};

/// A product brand. `name` is unique across brands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// `None` until the brand has been persisted
    pub id: Option<i64>,
    pub name: String,
}

impl Brand {
    /// Create a persisted brand value
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Create a brand that has not been saved yet
    pub fn unsaved(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Whether saving this brand inserts a new row
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}
