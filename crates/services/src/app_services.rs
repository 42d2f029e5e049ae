use std::sync::Arc;

use care_core::model::UserId;
use storage::repository::Storage;

use crate::Clock;
use crate::api::{
    AppointmentApi, AssistantApi, CommunityApi, DoctorApi, HttpAssistant, HttpBackend,
    ProgressApi, StoryApi,
};
use crate::appointment_service::AppointmentService;
use crate::broadcast::{LocalBroadcast, PostBroadcast};
use crate::chat_service::ChatService;
use crate::checkup_service::CheckupService;
use crate::community::{CommunityFeed, WizardFormController};
use crate::config::ServiceConfig;
use crate::doctor_service::DoctorService;
use crate::error::AppServicesError;
use crate::session_service::SessionService;
use crate::story_service::StoryService;
use crate::tracker_service::TrackerService;

/// Assembles app-facing services over one backend, one ML service, and one store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    config: ServiceConfig,
    progress: Arc<dyn ProgressApi>,
    community: Arc<dyn CommunityApi>,
    appointments: Arc<dyn AppointmentApi>,
    stories: Arc<dyn StoryApi>,
    doctors: Arc<dyn DoctorApi>,
    assistant: Arc<dyn AssistantApi>,
    broadcast: Arc<dyn PostBroadcast>,
    wizard: Arc<WizardFormController>,
    sessions: SessionService,
}

impl AppServices {
    /// Build services against the remote APIs, persisting identity in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or an HTTP
    /// client cannot be built.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: ServiceConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let backend = Arc::new(HttpBackend::new(&config)?);
        let assistant: Arc<dyn AssistantApi> = Arc::new(HttpAssistant::new(&config)?);
        Ok(Self::assemble(clock, config, backend, assistant, &storage))
    }

    /// Build services over caller-supplied backends and storage.
    #[must_use]
    pub fn with_backends<B>(
        clock: Clock,
        config: ServiceConfig,
        backend: Arc<B>,
        assistant: Arc<dyn AssistantApi>,
        storage: &Storage,
    ) -> Self
    where
        B: ProgressApi + CommunityApi + AppointmentApi + StoryApi + DoctorApi + 'static,
    {
        Self::assemble(clock, config, backend, assistant, storage)
    }

    fn assemble<B>(
        clock: Clock,
        config: ServiceConfig,
        backend: Arc<B>,
        assistant: Arc<dyn AssistantApi>,
        storage: &Storage,
    ) -> Self
    where
        B: ProgressApi + CommunityApi + AppointmentApi + StoryApi + DoctorApi + 'static,
    {
        let progress: Arc<dyn ProgressApi> = backend.clone();
        let community: Arc<dyn CommunityApi> = backend.clone();
        let appointments: Arc<dyn AppointmentApi> = backend.clone();
        let stories: Arc<dyn StoryApi> = backend.clone();
        let doctors: Arc<dyn DoctorApi> = backend;
        let broadcast: Arc<dyn PostBroadcast> = Arc::new(LocalBroadcast::default());
        let wizard = Arc::new(WizardFormController::new(
            Arc::clone(&community),
            Arc::clone(&broadcast),
        ));
        let sessions = SessionService::new(Arc::clone(&storage.sessions));

        Self {
            clock,
            config,
            progress,
            community,
            appointments,
            stories,
            doctors,
            assistant,
            broadcast,
            wizard,
            sessions,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> SessionService {
        self.sessions.clone()
    }

    #[must_use]
    pub fn tracker(&self, user: UserId) -> TrackerService {
        TrackerService::new(self.clock, Arc::clone(&self.progress), user)
    }

    /// The shared post wizard; every caller sees the same draft.
    #[must_use]
    pub fn wizard(&self) -> Arc<WizardFormController> {
        Arc::clone(&self.wizard)
    }

    #[must_use]
    pub fn feed(&self) -> CommunityFeed {
        CommunityFeed::new(Arc::clone(&self.community), Arc::clone(&self.broadcast))
    }

    #[must_use]
    pub fn chat(&self) -> ChatService {
        ChatService::new(Arc::clone(&self.assistant), self.config.typing_interval)
    }

    #[must_use]
    pub fn checkup(&self) -> CheckupService {
        CheckupService::new(Arc::clone(&self.assistant))
    }

    #[must_use]
    pub fn appointments(&self, user: UserId) -> AppointmentService {
        AppointmentService::new(Arc::clone(&self.appointments), user)
    }

    #[must_use]
    pub fn stories(&self) -> StoryService {
        StoryService::new(Arc::clone(&self.stories))
    }

    #[must_use]
    pub fn doctors(&self) -> DoctorService {
        DoctorService::new(Arc::clone(&self.doctors), self.sessions.clone())
    }
}
