use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validated tag name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Create a validated tag name.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TagError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TagError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a tag from a trending label such as `#SelfCare`.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName` if nothing remains after stripping `#`.
    pub fn from_trending(label: &str) -> Result<Self, TagError> {
        Self::new(label.trim().trim_start_matches('#'))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TagName {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}

/// Ordered set of tags, unique by exact (case-sensitive) name.
///
/// Used both for the tags attached to a new post and for the search-tag
/// filter of the community feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TagList(Vec<TagName>);

impl TagList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag after trimming it.
    ///
    /// Blank input and exact duplicates are ignored. Returns whether the list
    /// changed.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        let Ok(tag) = TagName::new(raw) else {
            return false;
        };
        self.push(tag)
    }

    /// Append an already validated tag unless it is present.
    pub fn push(&mut self, tag: TagName) -> bool {
        if self.contains(tag.as_str()) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Remove the first exact match. No-op if absent.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        match self.0.iter().position(|tag| tag.as_str() == name) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|tag| tag.as_str() == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagName> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_strings(&self) -> Vec<String> {
        self.0.iter().map(|tag| tag.as_str().to_string()).collect()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Rebuilds the list through `push`, so duplicates collapse to the first.
impl TryFrom<Vec<String>> for TagList {
    type Error = TagError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        let mut tags = Self::new();
        for value in values {
            tags.push(TagName::new(value)?);
        }
        Ok(tags)
    }
}

impl From<TagList> for Vec<String> {
    fn from(value: TagList) -> Self {
        value.0.into_iter().map(String::from).collect()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    #[error("tag name cannot be empty")]
    EmptyName,
}
