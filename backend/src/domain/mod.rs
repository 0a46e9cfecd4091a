//! Domain primitives, services and ports.
//!
//! Purpose: model package limits and guarded entity creation without any
//! transport concerns. Adapters live in `inbound` and `outbound`; they talk to
//! this module only through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - PackageLimitsService — limit queries and the validation policy.
//! - LimitGuard — quota gate in front of entity creation.

pub mod action_type;
pub mod enforcement;
pub mod entities;
pub mod entity_services;
pub mod error;
pub mod limits;
pub mod limits_service;
pub mod package;
pub mod package_limit_error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::action_type::{ActionType, ParseActionTypeError};
pub use self::enforcement::{GuardedCreateError, LimitGuard, ScopedCreate};
pub use self::entities::{
    Client, NewClient, NewEntity, NewPet, NewVisit, Pet, Visit, VisitStatus,
};
pub use self::entity_services::{
    DynClientService, DynPetService, DynVisitService, EntityServicesWithLimits,
    client_service_with_limits, pet_service_with_limits, visit_service_with_limits,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::limits::{
    ActiveSubscription, EffectiveLimits, LimitCheckMode, PackageLimits, UsageStats,
};
pub use self::limits_service::{
    LimitCheckError, PackageLimitsService, VERIFICATION_FAILED_MESSAGE, ValidationOutcome,
    ValidationReason, user_scope_hash,
};
pub use self::package::{Addon, AddonType, Package, SubscriptionStatus, UserAddon, UserSubscription};
pub use self::package_limit_error::PackageLimitError;
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserIdValidationError};
