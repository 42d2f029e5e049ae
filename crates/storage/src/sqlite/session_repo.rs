use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{SessionRepository, StorageError};
use care_core::model::{DoctorId, Gender, SessionContext, UserId};

use super::SqliteSessionStore;

#[async_trait]
impl SessionRepository for SqliteSessionStore {
    async fn load_session(&self) -> Result<Option<SessionContext>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, username, gender, token, doctor_id
            FROM session_identity
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: Option<String> = row
            .try_get("user_id")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let username: Option<String> = row
            .try_get("username")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let gender: String = row
            .try_get("gender")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let token: Option<String> = row
            .try_get("token")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let doctor_id: Option<String> = row
            .try_get("doctor_id")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(SessionContext::from_persisted(
            user_id.map(UserId::new),
            username,
            Gender::parse(&gender),
            token,
            doctor_id.map(DoctorId::new),
        )))
    }

    async fn save_session(&self, session: &SessionContext) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO session_identity (
                id,
                user_id,
                username,
                gender,
                token,
                doctor_id,
                updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                username = excluded.username,
                gender = excluded.gender,
                token = excluded.token,
                doctor_id = excluded.doctor_id,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(session.user_id().map(UserId::as_str))
        .bind(session.username())
        .bind(session.gender().as_str())
        .bind(session.token())
        .bind(session.doctor_id().map(DoctorId::as_str))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_identity WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
