use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use care_core::model::{Category, NewPost, Post, SessionContext, VERIFIED_NAME};
use care_core::wizard::{WizardDraft, WizardError, WizardStep};

use crate::api::CommunityApi;
use crate::broadcast::PostBroadcast;
use crate::cancel::CancelToken;
use crate::error::SubmitError;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The post was created, announced, and the draft reset to step 1.
    Submitted(Post),
    /// Another submit was still in flight; nothing was sent.
    AlreadyPending,
    /// `cancel` ran while the request was pending. Nothing was announced and
    /// the draft was left as the user has it now.
    Cancelled,
}

/// Drives the post wizard and owns its single in-flight submit.
///
/// Methods take `&self` so a view can keep editing (or cancel) while a submit
/// is awaiting the backend.
pub struct WizardFormController {
    api: Arc<dyn CommunityApi>,
    broadcast: Arc<dyn PostBroadcast>,
    form: Mutex<Form>,
    submitting: AtomicBool,
}

/// The draft plus what a pending submit needs to detect a cancel.
#[derive(Default)]
struct Form {
    draft: WizardDraft,
    /// Bumped by every `cancel`.
    generation: u64,
    pending: Option<CancelToken>,
}

/// Releases the in-flight flag when the submit future finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl WizardFormController {
    #[must_use]
    pub fn new(api: Arc<dyn CommunityApi>, broadcast: Arc<dyn PostBroadcast>) -> Self {
        Self {
            api,
            broadcast,
            form: Mutex::new(Form::default()),
            submitting: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current draft.
    #[must_use]
    pub fn draft(&self) -> WizardDraft {
        self.lock().draft.clone()
    }

    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.lock().draft.step()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.lock().draft.set_category(category);
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.lock().draft.set_content(content);
    }

    pub fn add_tag(&self, raw: &str) -> bool {
        self.lock().draft.add_tag(raw)
    }

    pub fn remove_tag(&self, name: &str) -> bool {
        self.lock().draft.remove_tag(name)
    }

    /// # Errors
    ///
    /// Returns `WizardError` when the current step is incomplete or already last.
    pub fn advance(&self) -> Result<WizardStep, WizardError> {
        self.lock().draft.advance()
    }

    /// # Errors
    ///
    /// Returns `WizardError::AtFirstStep` on step 1.
    pub fn back(&self) -> Result<WizardStep, WizardError> {
        self.lock().draft.back()
    }

    /// Discard the draft from any step and abandon a pending submit.
    pub fn cancel(&self) {
        let mut form = self.lock();
        form.draft.reset();
        form.generation += 1;
        if let Some(pending) = form.pending.take() {
            pending.cancel();
        }
    }

    /// Send the draft as a new post.
    ///
    /// A second call while one is pending returns `AlreadyPending` without a
    /// request. On failure the draft stays on step 3 untouched. A `cancel`
    /// while the request is pending drops it and returns `Cancelled`; edits
    /// made after the cancel are kept.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Validation` before any request if the draft is not
    /// on step 3 or is incomplete, and `SubmitError::Api` if the backend
    /// rejects the post.
    pub async fn submit(&self, session: &SessionContext) -> Result<SubmitOutcome, SubmitError> {
        if self.submitting.swap(true, Ordering::AcqRel) {
            return Ok(SubmitOutcome::AlreadyPending);
        }
        let _in_flight = InFlight(&self.submitting);

        let token = CancelToken::new();
        let (submission, generation) = {
            let mut form = self.lock();
            let submission = form.draft.prepare_submission()?;
            form.pending = Some(token.clone());
            (submission, form.generation)
        };
        let body = NewPost {
            category: submission.category,
            content: submission.content,
            tags: submission.tags,
            author_name: session.display_name_or(VERIFIED_NAME).to_string(),
        };

        let created = tokio::select! {
            biased;
            () = token.cancelled() => {
                info!("post submit cancelled while pending");
                return Ok(SubmitOutcome::Cancelled);
            }
            created = self.api.create_post(&body, session.gender()) => created,
        };

        let mut form = self.lock();
        if form.generation != generation {
            // Cancelled between the response and this lock.
            if let Ok(post) = &created {
                info!("not announcing post {}: draft was cancelled", post.id);
            }
            return Ok(SubmitOutcome::Cancelled);
        }
        form.pending = None;
        let post = match created {
            Ok(post) => post,
            Err(err) => {
                warn!("post submit failed: {err}");
                return Err(err.into());
            }
        };

        form.draft.reset();
        drop(form);
        self.broadcast.publish(&post);
        info!("published post {} in {}", post.id, post.category);
        Ok(SubmitOutcome::Submitted(post))
    }

    fn lock(&self) -> MutexGuard<'_, Form> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
