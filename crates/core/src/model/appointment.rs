use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AppointmentId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppointmentError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// A scheduled appointment as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: AppointmentId,
    pub user_id: UserId,
    pub title: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
}

/// Form state for scheduling a new appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub title: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
}

/// Validated create-appointment request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub user_id: UserId,
    pub title: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
}

impl AppointmentDraft {
    /// Validate every field and attach the owner.
    ///
    /// # Errors
    ///
    /// Returns `AppointmentError::MissingField` naming the first blank field.
    pub fn validate(&self, user_id: UserId) -> Result<NewAppointment, AppointmentError> {
        Ok(NewAppointment {
            user_id,
            title: required(&self.title, "title")?,
            doctor: required(&self.doctor, "doctor")?,
            date: required(&self.date, "date")?,
            time: required(&self.time, "time")?,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// New date and time for an existing appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reschedule {
    pub date: String,
    pub time: String,
}

impl Reschedule {
    /// # Errors
    ///
    /// Returns `AppointmentError::MissingField` if date or time is blank.
    pub fn new(date: &str, time: &str) -> Result<Self, AppointmentError> {
        Ok(Self {
            date: required(date, "date")?,
            time: required(time, "time")?,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, AppointmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_every_field() {
        let draft = AppointmentDraft {
            title: "Follow-up".into(),
            doctor: "Dr. Rao".into(),
            date: "30 May 2025".into(),
            time: " ".into(),
        };
        assert_eq!(
            draft.validate(UserId::new("u1")).unwrap_err(),
            AppointmentError::MissingField("time")
        );
    }

    #[test]
    fn draft_validates_and_trims() {
        let draft = AppointmentDraft {
            title: " Follow-up ".into(),
            doctor: "Dr. Rao".into(),
            date: "30 May 2025".into(),
            time: "4:00 PM".into(),
        };
        let body = draft.validate(UserId::new("u1")).unwrap();
        assert_eq!(body.title, "Follow-up");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["userId"], "u1");
    }

    #[test]
    fn reschedule_requires_both_values() {
        assert!(Reschedule::new("", "4:00 PM").is_err());
        assert!(Reschedule::new("1 Jun 2025", "4:00 PM").is_ok());
    }
}
