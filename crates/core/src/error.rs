use thiserror::Error;

use crate::model::{
    AppointmentError, CategoryError, CheckupError, DoctorError, PercentageError, SessionError,
    StoryError, TagError, TaskError,
};
use crate::progress::CalendarError;
use crate::wizard::WizardError;

/// Any validation failure raised before a request leaves the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Percentage(#[from] PercentageError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Appointment(#[from] AppointmentError),
    #[error(transparent)]
    Story(#[from] StoryError),
    #[error(transparent)]
    Checkup(#[from] CheckupError),
    #[error(transparent)]
    Doctor(#[from] DoctorError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
