//! Three-step post creation flow: category, then content, then tags.
//!
//! This is the synchronous half of the wizard. The services crate wraps it
//! with the network submit and the double-submit guard.

use serde::Serialize;
use thiserror::Error;

use crate::model::{Category, TagList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WizardStep {
    Category = 1,
    Content = 2,
    Tags = 3,
}

impl WizardStep {
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Category => "Choose a category",
            WizardStep::Content => "Write your post",
            WizardStep::Tags => "Add tags",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WizardError {
    #[error("select a category first")]
    MissingCategory,

    #[error("post content cannot be empty")]
    EmptyContent,

    #[error("already on the last step")]
    AtLastStep,

    #[error("already on the first step")]
    AtFirstStep,

    #[error("submit is only available on the tags step")]
    NotOnTagsStep,
}

/// In-progress post. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDraft {
    step: WizardStep,
    category: Option<Category>,
    content: String,
    tags: TagList,
}

impl Default for WizardDraft {
    fn default() -> Self {
        Self {
            step: WizardStep::Category,
            category: None,
            content: String::new(),
            tags: TagList::new(),
        }
    }
}

/// Validated payload handed to the network layer on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmission {
    pub category: Category,
    pub content: String,
    pub tags: TagList,
}

impl WizardDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn add_tag(&mut self, raw: &str) -> bool {
        self.tags.add_tag(raw)
    }

    pub fn remove_tag(&mut self, name: &str) -> bool {
        self.tags.remove_tag(name)
    }

    /// Whether the forward button should be enabled.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.check_advance().is_ok()
    }

    fn check_advance(&self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Category => {
                self.category.ok_or(WizardError::MissingCategory)?;
                Ok(WizardStep::Content)
            }
            WizardStep::Content => {
                if self.content.trim().is_empty() {
                    return Err(WizardError::EmptyContent);
                }
                Ok(WizardStep::Tags)
            }
            WizardStep::Tags => Err(WizardError::AtLastStep),
        }
    }

    /// Move forward one step if the current step validates. On error the
    /// draft is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `WizardError` naming the failed gate.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.check_advance()?;
        self.step = next;
        Ok(next)
    }

    /// Move back one step. Never validates.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::AtFirstStep` on the category step.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let prev = match self.step {
            WizardStep::Category => return Err(WizardError::AtFirstStep),
            WizardStep::Content => WizardStep::Category,
            WizardStep::Tags => WizardStep::Content,
        };
        self.step = prev;
        Ok(prev)
    }

    /// Re-validate everything and build the submit payload. The draft is not
    /// reset; that happens once the request succeeds.
    ///
    /// # Errors
    ///
    /// Returns `WizardError` if not on the tags step or a required field is empty.
    pub fn prepare_submission(&self) -> Result<PostSubmission, WizardError> {
        if self.step != WizardStep::Tags {
            return Err(WizardError::NotOnTagsStep);
        }
        let category = self.category.ok_or(WizardError::MissingCategory)?;
        let content = self.content.trim();
        if content.is_empty() {
            return Err(WizardError::EmptyContent);
        }
        Ok(PostSubmission {
            category,
            content: content.to_string(),
            tags: self.tags.clone(),
        })
    }

    /// Discard everything and return to a fresh first step.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
