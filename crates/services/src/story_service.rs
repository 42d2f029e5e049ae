use std::sync::Arc;

use log::info;

use care_core::model::{ANONYMOUS_NAME, SessionContext, Story, StoryDraft};

use crate::api::StoryApi;
use crate::error::StoryServiceError;

/// Public story wall plus the signed-in user's own stories.
pub struct StoryService {
    api: Arc<dyn StoryApi>,
    public: Vec<Story>,
    mine: Vec<Story>,
}

impl StoryService {
    #[must_use]
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self {
            api,
            public: Vec::new(),
            mine: Vec::new(),
        }
    }

    #[must_use]
    pub fn public_stories(&self) -> &[Story] {
        &self.public
    }

    #[must_use]
    pub fn my_stories(&self) -> &[Story] {
        &self.mine
    }

    /// # Errors
    ///
    /// Returns `StoryServiceError::Api` if either list cannot be loaded.
    pub async fn load(&mut self, session: &SessionContext) -> Result<(), StoryServiceError> {
        self.public = self.api.list_public_stories().await?;
        self.mine = self
            .api
            .list_user_stories(&session.effective_user_id())
            .await?;
        Ok(())
    }

    /// Share `draft` as the session's user, then refresh the public wall.
    ///
    /// # Errors
    ///
    /// Returns `StoryServiceError::Validation` before any request, or `Api` if
    /// the story is rejected (the draft is kept) or the wall cannot be
    /// refreshed afterwards.
    pub async fn submit(
        &mut self,
        draft: &mut StoryDraft,
        session: &SessionContext,
    ) -> Result<(), StoryServiceError> {
        let story = draft.validate(
            session.effective_user_id(),
            session.display_name_or(ANONYMOUS_NAME),
        )?;
        self.api.create_story(&story).await?;
        info!("shared story \"{}\"", story.title);
        draft.clear();
        self.public = self.api.list_public_stories().await?;
        Ok(())
    }
}
