//! Port for inserting quota-counted entities.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewEntity, UserId};

/// Errors raised by [`CreateEntity`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityRepositoryError {
    /// The backend enforced a quota at write time.
    #[error("package limit exceeded at write time: {detail}")]
    LimitExceeded { detail: String },
    /// Store connection could not be established.
    #[error("entity store connection failed: {message}")]
    Connection { message: String },
    /// Store did not answer in time.
    #[error("entity store timed out: {message}")]
    Timeout { message: String },
    /// Store refused the insert.
    #[error("entity store rejected the insert with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// Stored row did not match the expected shape.
    #[error("entity store returned an invalid payload: {message}")]
    Decode { message: String },
}

impl EntityRepositoryError {
    pub fn limit_exceeded(detail: impl Into<String>) -> Self {
        Self::LimitExceeded {
            detail: detail.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Insert one entity of payload type `P` on behalf of `owner`.
///
/// Implementations perform no quota checks of their own; wrap them in a
/// [`crate::domain::LimitGuard`] to enforce package limits.
#[async_trait]
pub trait CreateEntity<P: NewEntity>: Send + Sync {
    /// Store `payload` and return the created record.
    async fn create(&self, owner: UserId, payload: P) -> Result<P::Record, EntityRepositoryError>;
}

#[async_trait]
impl<P, T> CreateEntity<P> for Arc<T>
where
    P: NewEntity,
    T: CreateEntity<P> + ?Sized,
{
    async fn create(&self, owner: UserId, payload: P) -> Result<P::Record, EntityRepositoryError> {
        self.as_ref().create(owner, payload).await
    }
}

/// Fixture store that echoes the payload back as a fresh record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEntityStore;

#[async_trait]
impl<P: NewEntity> CreateEntity<P> for FixtureEntityStore {
    async fn create(&self, owner: UserId, payload: P) -> Result<P::Record, EntityRepositoryError> {
        Ok(payload.into_record(Uuid::new_v4(), owner, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewClient;

    #[tokio::test]
    async fn fixture_store_assigns_owner() {
        let owner = UserId::random();
        let client = FixtureEntityStore
            .create(
                owner,
                NewClient {
                    first_name: "Jan".to_owned(),
                    last_name: "Kowalski".to_owned(),
                    email: None,
                    phone: None,
                    address: None,
                    notes: None,
                },
            )
            .await
            .expect("fixture insert");
        assert_eq!(client.user_id, owner);
        assert_eq!(client.first_name, "Jan");
    }

    #[test]
    fn limit_error_mentions_detail() {
        let err = EntityRepositoryError::limit_exceeded("Osiągnięto limit zwierząt");
        assert_eq!(
            err.to_string(),
            "package limit exceeded at write time: Osiągnięto limit zwierząt"
        );
    }
}
