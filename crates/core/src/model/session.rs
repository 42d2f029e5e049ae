use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{DoctorId, UserId};

pub const DEMO_USER_ID: &str = "demoUser";
pub const ANONYMOUS_NAME: &str = "Anonymous";
pub const VERIFIED_NAME: &str = "CameraVerifiedUser";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("access denied: the community is open to women only")]
    AccessDenied,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unknown,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "female" => Gender::Female,
            "male" => Gender::Male,
            _ => Gender::Unknown,
        }
    }
}

/// Identity of the current user, passed explicitly to whatever needs it.
///
/// Populated at login or verification and cleared at logout. Persistence is
/// handled by the storage crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    user_id: Option<UserId>,
    username: Option<String>,
    gender: Gender,
    token: Option<String>,
    doctor_id: Option<DoctorId>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_user(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            username: Some(username.into()).filter(|name: &String| !name.trim().is_empty()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_persisted(
        user_id: Option<UserId>,
        username: Option<String>,
        gender: Gender,
        token: Option<String>,
        doctor_id: Option<DoctorId>,
    ) -> Self {
        Self {
            user_id,
            username,
            gender,
            token,
            doctor_id,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// The signed-in user id, or the shared demo account.
    #[must_use]
    pub fn effective_user_id(&self) -> UserId {
        self.user_id
            .clone()
            .unwrap_or_else(|| UserId::new(DEMO_USER_ID))
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn display_name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.username.as_deref().unwrap_or(fallback)
    }

    #[must_use]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn doctor_id(&self) -> Option<&DoctorId> {
        self.doctor_id.as_ref()
    }

    #[must_use]
    pub fn is_doctor(&self) -> bool {
        self.doctor_id.is_some() && self.token.is_some()
    }

    /// Record the outcome of the community gender check.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AccessDenied` when the check did not pass.
    pub fn verify_gender(&mut self, is_female: bool) -> Result<(), SessionError> {
        if is_female {
            self.gender = Gender::Female;
            Ok(())
        } else {
            self.gender = Gender::Male;
            Err(SessionError::AccessDenied)
        }
    }

    /// Forget any previous verification so the check runs again.
    pub fn reset_verification(&mut self) {
        self.gender = Gender::Unknown;
    }

    pub fn set_doctor_login(&mut self, token: impl Into<String>, doctor_id: DoctorId) {
        self.token = Some(token.into());
        self.doctor_id = Some(doctor_id);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
