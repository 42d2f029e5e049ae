use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use care_core::model::{
    CategoryFilter, FeedTab, Gender, Post, SessionContext, SessionError, TagList, TagName,
    filter_and_sort, format_relative,
};

use crate::api::CommunityApi;
use crate::broadcast::PostBroadcast;
use crate::error::FeedError;

/// Community posts as seen by one open feed: the loaded list plus live posts.
pub struct CommunityFeed {
    api: Arc<dyn CommunityApi>,
    broadcast: Arc<dyn PostBroadcast>,
    receiver: Option<Receiver<Post>>,
    posts: Vec<Post>,
    filter: CategoryFilter,
    tab: FeedTab,
    search_tags: TagList,
}

impl CommunityFeed {
    #[must_use]
    pub fn new(api: Arc<dyn CommunityApi>, broadcast: Arc<dyn PostBroadcast>) -> Self {
        Self {
            api,
            broadcast,
            receiver: None,
            posts: Vec::new(),
            filter: CategoryFilter::All,
            tab: FeedTab::Recent,
            search_tags: TagList::new(),
        }
    }

    /// Join the live channel and load the current posts.
    ///
    /// The feed subscribes before loading so a post created in between is not
    /// missed; duplicates are dropped on arrival.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Access` unless the session passed the gender check,
    /// and `FeedError::Api` if the list cannot be loaded.
    pub async fn open(&mut self, session: &SessionContext) -> Result<usize, FeedError> {
        if session.gender() != Gender::Female {
            return Err(SessionError::AccessDenied.into());
        }
        self.receiver = Some(self.broadcast.subscribe());
        self.reload().await
    }

    /// # Errors
    ///
    /// Returns `FeedError::Api` if the list cannot be loaded; the previous
    /// posts are kept.
    pub async fn reload(&mut self) -> Result<usize, FeedError> {
        self.posts = self.api.list_posts().await?;
        info!("loaded {} community posts", self.posts.len());
        Ok(self.posts.len())
    }

    /// Leave the live channel.
    pub fn close(&mut self) {
        self.receiver = None;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.receiver.is_some()
    }

    /// Prepend `post` unless a post with the same id is already shown.
    pub fn receive(&mut self, post: Post) -> bool {
        if self.posts.iter().any(|existing| existing.id == post.id) {
            return false;
        }
        self.posts.insert(0, post);
        true
    }

    /// Apply every broadcast post queued since the last call.
    pub fn drain_live(&mut self) -> usize {
        let mut added = 0;
        loop {
            let Some(receiver) = self.receiver.as_mut() else {
                return added;
            };
            match receiver.try_recv() {
                Ok(post) => {
                    if self.receive(post) {
                        added += 1;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("feed fell behind by {skipped} live posts");
                }
                Err(TryRecvError::Empty) => return added,
                Err(TryRecvError::Closed) => {
                    self.receiver = None;
                    return added;
                }
            }
        }
    }

    /// Wait for the next live post that is not already shown.
    ///
    /// Returns `None` once the feed is closed or the channel shuts down.
    pub async fn next_live(&mut self) -> Option<&Post> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(post) => {
                    if self.receive(post) {
                        return self.posts.first();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("feed fell behind by {skipped} live posts");
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn set_tab(&mut self, tab: FeedTab) {
        self.tab = tab;
    }

    pub fn add_search_tag(&mut self, raw: &str) -> bool {
        self.search_tags.add_tag(raw)
    }

    pub fn remove_search_tag(&mut self, name: &str) -> bool {
        self.search_tags.remove_tag(name)
    }

    /// Search by a trending label such as `#Wellness`.
    pub fn search_trending(&mut self, label: &str) -> bool {
        match TagName::from_trending(label) {
            Ok(tag) => self.search_tags.push(tag),
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    #[must_use]
    pub fn tab(&self) -> FeedTab {
        self.tab
    }

    #[must_use]
    pub fn search_tags(&self) -> &TagList {
        &self.search_tags
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Posts after the category filter, tag search, and tab ordering.
    #[must_use]
    pub fn visible(&self) -> Vec<&Post> {
        filter_and_sort(&self.posts, self.filter, &self.search_tags, self.tab)
    }

    /// Visible posts paired with their "time ago" label.
    #[must_use]
    pub fn visible_with_age(&self, now: DateTime<Utc>) -> Vec<(&Post, String)> {
        self.visible()
            .into_iter()
            .map(|post| (post, format_relative(post.created_at, now)))
            .collect()
    }
}
