#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod appointment_service;
pub mod broadcast;
pub mod cancel;
pub mod chat_service;
pub mod checkup_service;
pub mod community;
pub mod config;
pub mod doctor_service;
pub mod error;
pub mod session_service;
pub mod story_service;
pub mod tracker_service;

pub use care_core::Clock;

pub use app_services::AppServices;
pub use appointment_service::AppointmentService;
pub use broadcast::{LocalBroadcast, PostBroadcast};
pub use cancel::CancelToken;
pub use chat_service::{ChatOutcome, ChatService};
pub use checkup_service::CheckupService;
pub use community::{CommunityFeed, SubmitOutcome, WizardFormController};
pub use config::ServiceConfig;
pub use doctor_service::DoctorService;
pub use error::{
    ApiError, AppServicesError, AppointmentServiceError, AuthError, ChatError,
    CheckupServiceError, ConfigError, FeedError, StoryServiceError, SubmitError, TrackerError,
};
pub use session_service::SessionService;
pub use story_service::StoryService;
pub use tracker_service::{TrackerService, TrackerUpdate};
