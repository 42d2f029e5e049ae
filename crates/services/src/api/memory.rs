//! Scripted in-process backends for tests and offline runs.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use care_core::Clock;
use care_core::model::{
    Appointment, AppointmentId, AuthGrant, Credentials, DoctorId, DoctorSignup, Gender,
    HealthFeatures, NewAppointment, NewPost, NewStory, Post, PostId, Reschedule, RiskAssessment,
    Story, StoryId, UserId,
};
use care_core::progress::ProgressRecord;

use super::{AppointmentApi, AssistantApi, CommunityApi, DoctorApi, ProgressApi, StoryApi};
use crate::error::ApiError;

/// Remote operations, used to inject failures and inspect traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FetchProgress,
    CompleteToday,
    ListPosts,
    CreatePost,
    ListAppointments,
    CreateAppointment,
    RescheduleAppointment,
    CancelAppointment,
    ListPublicStories,
    ListUserStories,
    CreateStory,
    Login,
    Register,
    CreateProfile,
    Chat,
    Predict,
}

struct Doctor {
    email: String,
    password: String,
    id: DoctorId,
}

#[derive(Default)]
struct BackendState {
    clock: Clock,
    calls: Vec<Endpoint>,
    failing: HashSet<Endpoint>,
    progress: Vec<(UserId, ProgressRecord)>,
    posts: Vec<Post>,
    post_genders: Vec<Gender>,
    appointments: Vec<Appointment>,
    stories: Vec<Story>,
    doctors: Vec<Doctor>,
    next_id: u64,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Behaves like the healthcare backend, including its access rules.
///
/// Clones share state, so a test can keep a handle while services own another.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    latency: Duration,
    state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        let backend = Self::default();
        backend.state().clock = clock;
        backend
    }

    /// Delay every call by `latency`, so requests can be observed in flight.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_clock(&self, clock: Clock) {
        self.state().clock = clock;
    }

    /// Make `endpoint` fail until `recover` is called.
    pub fn fail(&self, endpoint: Endpoint) {
        self.state().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.state().failing.remove(&endpoint);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Endpoint> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == endpoint)
            .count()
    }

    pub fn seed_post(&self, post: Post) {
        self.state().posts.push(post);
    }

    pub fn seed_progress(&self, user: UserId, record: ProgressRecord) {
        self.state().progress.push((user, record));
    }

    pub fn seed_appointment(&self, appointment: Appointment) {
        self.state().appointments.push(appointment);
    }

    pub fn seed_story(&self, story: Story) {
        self.state().stories.push(story);
    }

    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.state().posts.clone()
    }

    /// Gender header sent with each create-post call, in order.
    #[must_use]
    pub fn post_genders(&self) -> Vec<Gender> {
        self.state().post_genders.clone()
    }

    #[must_use]
    pub fn stories(&self) -> Vec<Story> {
        self.state().stories.clone()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        self.state().calls.push(endpoint);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.state().failing.contains(&endpoint) {
            return Err(ApiError::Unavailable(format!("{endpoint:?} is failing")));
        }
        Ok(())
    }
}

fn rejected(status: StatusCode, message: &str) -> ApiError {
    ApiError::HttpStatus {
        status,
        message: Some(message.to_string()),
    }
}

#[async_trait]
impl ProgressApi for InMemoryBackend {
    async fn fetch_progress(&self, user: &UserId) -> Result<Vec<ProgressRecord>, ApiError> {
        self.enter(Endpoint::FetchProgress).await?;
        Ok(self
            .state()
            .progress
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn complete_today(&self, user: &UserId) -> Result<(), ApiError> {
        self.enter(Endpoint::CompleteToday).await?;
        let mut state = self.state();
        let date = state.clock.today().format("%Y-%m-%d").to_string();
        state.progress.push((
            user.clone(),
            ProgressRecord {
                date,
                completed: true,
            },
        ));
        Ok(())
    }
}

#[async_trait]
impl CommunityApi for InMemoryBackend {
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.enter(Endpoint::ListPosts).await?;
        let mut posts = self.state().posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_post(&self, post: &NewPost, gender: Gender) -> Result<Post, ApiError> {
        self.enter(Endpoint::CreatePost).await?;
        let mut state = self.state();
        state.post_genders.push(gender);
        if gender != Gender::Female {
            return Err(rejected(
                StatusCode::FORBIDDEN,
                "Only verified female users can post",
            ));
        }
        let created = Post {
            id: PostId::new(state.next_id("post")),
            category: post.category.label().to_string(),
            content: post.content.clone(),
            tags: post.tags.as_strings(),
            author_name: Some(post.author_name.clone()),
            likes: 0,
            comments: 0,
            created_at: state.clock.now(),
        };
        state.posts.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl AppointmentApi for InMemoryBackend {
    async fn list_appointments(&self, user: &UserId) -> Result<Vec<Appointment>, ApiError> {
        self.enter(Endpoint::ListAppointments).await?;
        Ok(self
            .state()
            .appointments
            .iter()
            .filter(|appointment| &appointment.user_id == user)
            .cloned()
            .collect())
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, ApiError> {
        self.enter(Endpoint::CreateAppointment).await?;
        let mut state = self.state();
        let created = Appointment {
            id: AppointmentId::new(state.next_id("appt")),
            user_id: appointment.user_id.clone(),
            title: appointment.title.clone(),
            doctor: appointment.doctor.clone(),
            date: appointment.date.clone(),
            time: appointment.time.clone(),
        };
        state.appointments.push(created.clone());
        Ok(created)
    }

    async fn reschedule_appointment(
        &self,
        id: &AppointmentId,
        change: &Reschedule,
    ) -> Result<Appointment, ApiError> {
        self.enter(Endpoint::RescheduleAppointment).await?;
        let mut state = self.state();
        let appointment = state
            .appointments
            .iter_mut()
            .find(|appointment| &appointment.id == id)
            .ok_or_else(|| rejected(StatusCode::NOT_FOUND, "Appointment not found"))?;
        appointment.date.clone_from(&change.date);
        appointment.time.clone_from(&change.time);
        Ok(appointment.clone())
    }

    async fn cancel_appointment(&self, id: &AppointmentId) -> Result<(), ApiError> {
        self.enter(Endpoint::CancelAppointment).await?;
        let mut state = self.state();
        let before = state.appointments.len();
        state.appointments.retain(|appointment| &appointment.id != id);
        if state.appointments.len() == before {
            return Err(rejected(StatusCode::NOT_FOUND, "Appointment not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl StoryApi for InMemoryBackend {
    async fn list_public_stories(&self) -> Result<Vec<Story>, ApiError> {
        self.enter(Endpoint::ListPublicStories).await?;
        Ok(self
            .state()
            .stories
            .iter()
            .filter(|story| story.is_public)
            .cloned()
            .collect())
    }

    async fn list_user_stories(&self, user: &UserId) -> Result<Vec<Story>, ApiError> {
        self.enter(Endpoint::ListUserStories).await?;
        Ok(self
            .state()
            .stories
            .iter()
            .filter(|story| &story.user_id == user)
            .cloned()
            .collect())
    }

    async fn create_story(&self, story: &NewStory) -> Result<(), ApiError> {
        self.enter(Endpoint::CreateStory).await?;
        let mut state = self.state();
        let created = Story {
            id: StoryId::new(state.next_id("story")),
            user_id: story.user_id.clone(),
            user_name: Some(story.user_name.clone()),
            title: story.title.clone(),
            content: story.content.clone(),
            image: Some(story.image.clone()).filter(|image| !image.is_empty()),
            is_public: story.is_public,
        };
        state.stories.push(created);
        Ok(())
    }
}

#[async_trait]
impl DoctorApi for InMemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        self.enter(Endpoint::Login).await?;
        let doctor_id = self
            .state()
            .doctors
            .iter()
            .find(|doctor| {
                doctor.email == credentials.email && doctor.password == credentials.password
            })
            .map(|doctor| doctor.id.clone())
            .ok_or_else(|| rejected(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
        Ok(AuthGrant {
            token: format!("token-{doctor_id}"),
            doctor_id,
        })
    }

    async fn register(&self, signup: &DoctorSignup) -> Result<(), ApiError> {
        self.enter(Endpoint::Register).await?;
        let mut state = self.state();
        let email = &signup.credentials.email;
        if state.doctors.iter().any(|doctor| &doctor.email == email) {
            return Err(rejected(StatusCode::BAD_REQUEST, "Doctor already exists"));
        }
        let id = DoctorId::new(state.next_id("doctor"));
        state.doctors.push(Doctor {
            email: email.clone(),
            password: signup.credentials.password.clone(),
            id,
        });
        Ok(())
    }

    async fn create_profile(&self, signup: &DoctorSignup) -> Result<AuthGrant, ApiError> {
        self.enter(Endpoint::CreateProfile).await?;
        let mut state = self.state();
        let credentials = &signup.credentials;
        let existing = state
            .doctors
            .iter()
            .find(|doctor| doctor.email == credentials.email)
            .map(|doctor| (doctor.password == credentials.password, doctor.id.clone()));
        let id = match existing {
            Some((true, id)) => id,
            Some((false, _)) => {
                return Err(rejected(StatusCode::UNAUTHORIZED, "Invalid credentials"));
            }
            None => {
                let id = DoctorId::new(state.next_id("doctor"));
                state.doctors.push(Doctor {
                    email: credentials.email.clone(),
                    password: credentials.password.clone(),
                    id: id.clone(),
                });
                id
            }
        };
        Ok(AuthGrant {
            token: format!("token-{id}"),
            doctor_id: id,
        })
    }
}

#[derive(Default)]
struct AssistantState {
    replies: VecDeque<Option<String>>,
    prompts: Vec<String>,
    features: Vec<HealthFeatures>,
    assessment: Option<RiskAssessment>,
    failing: bool,
}

/// ML service fake that answers from a queue of canned replies.
#[derive(Clone, Default)]
pub struct ScriptedAssistant {
    latency: Duration,
    state: Arc<Mutex<AssistantState>>,
}

impl ScriptedAssistant {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue the next `/chat` reply. `None` mimics a body without `reply`.
    pub fn push_reply(&self, reply: Option<&str>) {
        self.state().replies.push_back(reply.map(str::to_string));
    }

    pub fn set_assessment(&self, assessment: RiskAssessment) {
        self.state().assessment = Some(assessment);
    }

    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Prompts received by `/chat`, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Feature payloads received by `/predict`, in order.
    #[must_use]
    pub fn predictions_requested(&self) -> Vec<HealthFeatures> {
        self.state().features.clone()
    }

    fn state(&self) -> MutexGuard<'_, AssistantState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) -> Result<(), ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.state().failing {
            return Err(ApiError::Unavailable("assistant is failing".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AssistantApi for ScriptedAssistant {
    async fn chat(&self, message: &str) -> Result<Option<String>, ApiError> {
        self.state().prompts.push(message.to_string());
        self.delay().await?;
        Ok(self.state().replies.pop_front().flatten())
    }

    async fn predict(&self, features: &HealthFeatures) -> Result<RiskAssessment, ApiError> {
        self.state().features.push(features.clone());
        self.delay().await?;
        self.state()
            .assessment
            .clone()
            .ok_or_else(|| rejected(StatusCode::INTERNAL_SERVER_ERROR, "model not loaded"))
    }
}
