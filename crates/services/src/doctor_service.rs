use std::sync::Arc;

use log::info;

use care_core::model::{Credentials, DoctorSignup, SessionContext};

use crate::api::DoctorApi;
use crate::error::AuthError;
use crate::session_service::SessionService;

/// Doctor sign-up, profile creation, and login.
#[derive(Clone)]
pub struct DoctorService {
    api: Arc<dyn DoctorApi>,
    sessions: SessionService,
}

impl DoctorService {
    #[must_use]
    pub fn new(api: Arc<dyn DoctorApi>, sessions: SessionService) -> Self {
        Self { api, sessions }
    }

    /// Sign in and persist the token and doctor id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for rejected credentials (the server message is
    /// available through `ApiError::server_message`), or `Storage`.
    pub async fn login(
        &self,
        session: &mut SessionContext,
        credentials: &Credentials,
    ) -> Result<(), AuthError> {
        let grant = self.api.login(credentials).await?;
        session.set_doctor_login(grant.token, grant.doctor_id);
        self.sessions.save(session).await?;
        info!("doctor signed in as {}", credentials.email);
        Ok(())
    }

    /// Create the account. The caller continues with `create_profile`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the backend refuses the sign-up.
    pub async fn register(&self, signup: &DoctorSignup) -> Result<(), AuthError> {
        self.api.register(signup).await?;
        info!("registered doctor {}", signup.credentials.email);
        Ok(())
    }

    /// Publish the profile and sign in with the grant it returns.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the profile is rejected, or `Storage`.
    pub async fn create_profile(
        &self,
        session: &mut SessionContext,
        signup: &DoctorSignup,
    ) -> Result<(), AuthError> {
        let grant = self.api.create_profile(signup).await?;
        session.set_doctor_login(grant.token, grant.doctor_id);
        self.sessions.save(session).await?;
        info!("created profile for {}", signup.details.name);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored identity cannot be removed.
    pub async fn logout(&self, session: &mut SessionContext) -> Result<(), AuthError> {
        self.sessions.logout(session).await
    }
}
