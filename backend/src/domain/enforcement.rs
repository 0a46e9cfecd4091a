//! Package-limit gate in front of entity creation.
//!
//! [`LimitGuard`] decorates any [`CreateEntity`] store. Each create first
//! hard-checks the bound quota dimension and only then forwards the payload.
//! The check and the insert are two separate backend calls, so concurrent
//! creates may still overshoot the quota.

use std::marker::PhantomData;

use tracing::debug;

use crate::domain::ports::{CreateEntity, EntityRepositoryError, PackageLimitsQueryError};
use crate::domain::{
    ActionType, Error, LimitCheckError, NewEntity, PackageLimitError, PackageLimitsService, UserId,
};

/// Creation request scoped to the acting user.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedCreate<P> {
    /// Acting user; required.
    pub user_id: Option<UserId>,
    /// Entity payload, forwarded untouched.
    pub payload: P,
}

impl<P> ScopedCreate<P> {
    /// Request on behalf of `user_id`.
    pub fn new(user_id: UserId, payload: P) -> Self {
        Self {
            user_id: Some(user_id),
            payload,
        }
    }
}

/// Errors raised by [`LimitGuard::create`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardedCreateError {
    /// The request carried no user id. Indicates a caller bug.
    #[error("user id is required for limit-checked creation")]
    MissingUserId,
    /// The package does not permit another entity.
    #[error(transparent)]
    LimitExceeded(PackageLimitError),
    /// The limit check itself failed.
    #[error("package limit check failed: {0}")]
    LimitQuery(PackageLimitsQueryError),
    /// The store failed after the check passed.
    #[error("entity creation failed: {0}")]
    Create(EntityRepositoryError),
}

impl From<LimitCheckError> for GuardedCreateError {
    fn from(err: LimitCheckError) -> Self {
        match err {
            LimitCheckError::LimitExceeded(refusal) => Self::LimitExceeded(refusal),
            LimitCheckError::Query(query) => Self::LimitQuery(query),
        }
    }
}

/// Store decorator enforcing one quota dimension.
pub struct LimitGuard<P, C> {
    limits: PackageLimitsService,
    store: C,
    action: ActionType,
    payload: PhantomData<fn(P)>,
}

impl<P, C> LimitGuard<P, C>
where
    P: NewEntity,
    C: CreateEntity<P>,
{
    /// Guard `store` with the `action` quota.
    pub fn new(limits: PackageLimitsService, store: C, action: ActionType) -> Self {
        Self {
            limits,
            store,
            action,
            payload: PhantomData,
        }
    }

    /// Quota dimension this guard checks.
    #[must_use]
    pub fn action(&self) -> ActionType {
        self.action
    }

    /// Check the quota, then create the entity.
    ///
    /// The store is never called when the user id is missing or the check
    /// refuses; otherwise it is called exactly once.
    pub async fn create(&self, request: ScopedCreate<P>) -> Result<P::Record, GuardedCreateError> {
        let ScopedCreate { user_id, payload } = request;
        let user_id = user_id.ok_or(GuardedCreateError::MissingUserId)?;

        self.limits
            .validate_package_limit(&user_id, self.action)
            .await?;

        debug!(action = %self.action, table = P::TABLE, "limit check passed, creating entity");
        self.store
            .create(user_id, payload)
            .await
            .map_err(|err| match err {
                EntityRepositoryError::LimitExceeded { detail } => {
                    GuardedCreateError::LimitExceeded(PackageLimitError::new(detail, self.action))
                }
                other => GuardedCreateError::Create(other),
            })
    }
}

impl From<EntityRepositoryError> for Error {
    fn from(err: EntityRepositoryError) -> Self {
        match err {
            EntityRepositoryError::LimitExceeded { detail } if !detail.trim().is_empty() => {
                Error::package_limit_exceeded(detail)
            }
            EntityRepositoryError::LimitExceeded { .. } => {
                Error::package_limit_exceeded("Package limit reached")
            }
            EntityRepositoryError::Connection { .. } | EntityRepositoryError::Timeout { .. } => {
                Error::service_unavailable(format!("entity store unavailable: {err}"))
            }
            EntityRepositoryError::Rejected { .. } | EntityRepositoryError::Decode { .. } => {
                Error::internal(format!("entity store error: {err}"))
            }
        }
    }
}

impl From<GuardedCreateError> for Error {
    fn from(err: GuardedCreateError) -> Self {
        match err {
            GuardedCreateError::MissingUserId => Error::invalid_request(err.to_string()),
            GuardedCreateError::LimitExceeded(refusal) => refusal.into(),
            GuardedCreateError::LimitQuery(query) => query.into(),
            GuardedCreateError::Create(store) => store.into(),
        }
    }
}

#[cfg(test)]
#[path = "enforcement_tests.rs"]
mod tests;
