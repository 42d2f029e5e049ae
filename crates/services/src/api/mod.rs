//! Remote seams: the healthcare REST backend and the ML assistant.
//!
//! Every trait has a reqwest implementation in [`http`] and a scripted fake in
//! [`memory`].

use async_trait::async_trait;

use care_core::model::{
    Appointment, AppointmentId, AuthGrant, Credentials, DoctorSignup, Gender, HealthFeatures,
    NewAppointment, NewPost, NewStory, Post, Reschedule, RiskAssessment, Story, UserId,
};
use care_core::progress::ProgressRecord;

use crate::error::ApiError;

pub mod http;
pub mod memory;

pub use http::{HttpAssistant, HttpBackend};
pub use memory::{Endpoint, InMemoryBackend, ScriptedAssistant};

#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// `GET /progress/:userId`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn fetch_progress(&self, user: &UserId) -> Result<Vec<ProgressRecord>, ApiError>;

    /// `POST /progress/complete`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or status failure.
    async fn complete_today(&self, user: &UserId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait CommunityApi: Send + Sync {
    /// `GET /community`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError>;

    /// `POST /community`, with the verified gender in `x-user-gender`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn create_post(&self, post: &NewPost, gender: Gender) -> Result<Post, ApiError>;
}

#[async_trait]
pub trait AppointmentApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn list_appointments(&self, user: &UserId) -> Result<Vec<Appointment>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn reschedule_appointment(
        &self,
        id: &AppointmentId,
        change: &Reschedule,
    ) -> Result<Appointment, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or status failure.
    async fn cancel_appointment(&self, id: &AppointmentId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait StoryApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn list_public_stories(&self) -> Result<Vec<Story>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn list_user_stories(&self, user: &UserId) -> Result<Vec<Story>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or status failure.
    async fn create_story(&self, story: &NewStory) -> Result<(), ApiError>;
}

#[async_trait]
pub trait DoctorApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` for rejected credentials or transport failure.
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport or status failure.
    async fn register(&self, signup: &DoctorSignup) -> Result<(), ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn create_profile(&self, signup: &DoctorSignup) -> Result<AuthGrant, ApiError>;
}

/// The ML service: free-text assistant and PCOD risk model.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// `POST /chat`. `None` when the service answered without a reply.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn chat(&self, message: &str) -> Result<Option<String>, ApiError>;

    /// `POST /predict`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or decode failure.
    async fn predict(&self, features: &HealthFeatures) -> Result<RiskAssessment, ApiError>;
}
