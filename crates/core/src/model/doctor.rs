use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::DoctorId;
use crate::model::session::Gender;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DoctorError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("experience must be a whole number of years")]
    InvalidExperience,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns `DoctorError::MissingField` for a blank email or password.
    pub fn new(email: &str, password: &str) -> Result<Self, DoctorError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(DoctorError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(DoctorError::MissingField("password"));
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// Professional details shared by sign-up and profile creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorDetails {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub specialization: String,
    pub experience: u32,
}

impl DoctorDetails {
    /// # Errors
    ///
    /// Returns `DoctorError` for blank fields or a non-numeric experience.
    pub fn new(
        name: &str,
        specialization: &str,
        experience: &str,
        gender: Option<Gender>,
    ) -> Result<Self, DoctorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DoctorError::MissingField("name"));
        }
        let specialization = specialization.trim();
        if specialization.is_empty() {
            return Err(DoctorError::MissingField("specialization"));
        }
        let experience = experience
            .trim()
            .parse::<u32>()
            .map_err(|_| DoctorError::InvalidExperience)?;
        Ok(Self {
            name: name.to_string(),
            gender,
            specialization: specialization.to_string(),
            experience,
        })
    }
}

/// Body for registration and profile creation: credentials plus details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorSignup {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(flatten)]
    pub details: DoctorDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    pub token: String,
    pub doctor_id: DoctorId,
}
