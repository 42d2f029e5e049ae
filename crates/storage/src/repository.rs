use async_trait::async_trait;
use care_core::model::SessionContext;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Device-local store for the signed-in identity.
///
/// Read once at startup, written on login or verification, cleared on logout.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the stored identity, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn load_session(&self) -> Result<Option<SessionContext>, StorageError>;

    /// Replace the stored identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the identity cannot be written.
    async fn save_session(&self, session: &SessionContext) -> Result<(), StorageError>;

    /// Forget the stored identity. No-op when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    session: Arc<Mutex<Option<SessionContext>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn load_session(&self) -> Result<Option<SessionContext>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_session(&self, session: &SessionContext) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemoryRepository::new());
        Self { sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_core::model::{DoctorId, UserId};

    #[tokio::test]
    async fn round_trips_session() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_session().await.unwrap().is_none());

        let mut session = SessionContext::for_user(UserId::new("u1"), "Asha");
        session.set_doctor_login("tok", DoctorId::new("d1"));
        repo.save_session(&session).await.unwrap();

        let loaded = repo.load_session().await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn clear_forgets_session() {
        let storage = Storage::in_memory();
        let session = SessionContext::for_user(UserId::new("u1"), "Asha");
        storage.sessions.save_session(&session).await.unwrap();
        storage.sessions.clear_session().await.unwrap();
        storage.sessions.clear_session().await.unwrap();
        assert!(storage.sessions.load_session().await.unwrap().is_none());
    }
}
