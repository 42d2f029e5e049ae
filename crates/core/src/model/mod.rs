mod appointment;
mod chat;
mod checkup;
mod doctor;
mod ids;
mod percentage;
mod post;
mod session;
mod story;
mod tag;
mod task;

pub use ids::{AppointmentId, DoctorId, ParseIdError, PostId, StoryId, TaskId, UserId};

pub use appointment::{Appointment, AppointmentDraft, AppointmentError, NewAppointment, Reschedule};
pub use chat::{
    ChatMessage, ChatTranscript, ERROR_REPLY, FALLBACK_REPLY, GREETING, Speaker, sanitize_reply,
    styled_prompt,
};
pub use checkup::{CheckupError, CheckupForm, DEFAULT_INSULIN, HealthFeatures, RiskAssessment, Symptom};
pub use doctor::{AuthGrant, Credentials, DoctorDetails, DoctorError, DoctorSignup};
pub use percentage::{Percentage, PercentageError};
pub use post::{
    Category, CategoryError, CategoryFilter, FeedTab, NewPost, Post, TRENDING_TAGS,
    filter_and_sort, format_relative,
};
pub use session::{
    ANONYMOUS_NAME, DEMO_USER_ID, Gender, SessionContext, SessionError, VERIFIED_NAME,
};
pub use story::{NewStory, Story, StoryDraft, StoryError};
pub use tag::{TagError, TagList, TagName};
pub use task::{PLACEHOLDER_IMAGE, Task, TaskError, TaskList};
