use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::{StoryId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoryError {
    #[error("story title cannot be empty")]
    EmptyTitle,
    #[error("story content cannot be empty")]
    EmptyContent,
    #[error("invalid image URL")]
    InvalidImageUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(rename = "_id")]
    pub id: StoryId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    pub content: String,
    pub image: String,
    pub is_public: bool,
}

impl Default for StoryDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            image: String::new(),
            is_public: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStory {
    pub user_id: UserId,
    pub user_name: String,
    pub title: String,
    pub content: String,
    pub image: String,
    pub is_public: bool,
}

impl StoryDraft {
    /// Validate the draft into a request body.
    ///
    /// # Errors
    ///
    /// Returns `StoryError` for a blank title/content or an unparsable image URL.
    pub fn validate(&self, user_id: UserId, user_name: &str) -> Result<NewStory, StoryError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(StoryError::EmptyTitle);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(StoryError::EmptyContent);
        }
        let image = self.image.trim();
        if !image.is_empty() && Url::parse(image).is_err() {
            return Err(StoryError::InvalidImageUrl);
        }

        Ok(NewStory {
            user_id,
            user_name: user_name.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            image: image.to_string(),
            is_public: self.is_public,
        })
    }

    /// Clear the text fields; the visibility choice is kept.
    pub fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
        self.image.clear();
    }
}
