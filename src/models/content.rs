use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token naming one exact version of an item's content.
///
/// Only equality is meaningful; two markers are never ordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionMarker(String);

impl RevisionMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RevisionMarker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RevisionMarker {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RevisionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
    pub revision: RevisionMarker,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, body: impl Into<String>, revision: impl Into<RevisionMarker>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            body: body.into(),
            revision: revision.into(),
        }
    }
}
