use std::sync::Arc;

use log::{info, warn};

use care_core::model::SessionContext;
use storage::repository::SessionRepository;

use crate::error::AuthError;

/// Loads, updates, and forgets the device's stored identity.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Identity stored by a previous run, or an anonymous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store cannot be read.
    pub async fn restore(&self) -> Result<SessionContext, AuthError> {
        let session = self.sessions.load_session().await?.unwrap_or_default();
        info!("restored session for {}", session.effective_user_id());
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the identity cannot be written.
    pub async fn save(&self, session: &SessionContext) -> Result<(), AuthError> {
        self.sessions.save_session(session).await?;
        Ok(())
    }

    /// Record the community gender check and persist the outcome.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` when access is denied (the outcome is still
    /// stored), or `AuthError::Storage` if it cannot be written.
    pub async fn verify_community_access(
        &self,
        session: &mut SessionContext,
        is_female: bool,
    ) -> Result<(), AuthError> {
        let verdict = session.verify_gender(is_female);
        self.sessions.save_session(session).await?;
        if verdict.is_err() {
            warn!("community access denied for {}", session.effective_user_id());
        }
        verdict.map_err(AuthError::from)
    }

    /// Forget the identity in memory and on the device.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored identity cannot be removed;
    /// the in-memory session is cleared regardless.
    pub async fn logout(&self, session: &mut SessionContext) -> Result<(), AuthError> {
        session.clear();
        self.sessions.clear_session().await?;
        info!("signed out");
        Ok(())
    }
}
