//! Quota-counted practice records: clients, pets and visits.
//!
//! `New*` types are creation payloads; the matching record type is what the
//! backend returns after the insert. Payloads never carry the owning user;
//! the owner travels separately so the limit guard can check it first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Creation payload with a known record type and backend table.
pub trait NewEntity: Send + Sync + 'static {
    /// Row returned once the entity is stored.
    type Record: Send + Sync + 'static;

    /// Backend table name.
    const TABLE: &'static str;

    /// Materialise the record the backend would return for this payload.
    fn into_record(self, id: Uuid, owner: UserId, created_at: DateTime<Utc>) -> Self::Record;
}

/// Client creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Stored client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: Uuid,
    /// Owning specialist.
    pub user_id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact e-mail.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl NewEntity for NewClient {
    type Record = Client;
    const TABLE: &'static str = "clients";

    fn into_record(self, id: Uuid, owner: UserId, created_at: DateTime<Utc>) -> Client {
        Client {
            id,
            user_id: owner,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            notes: self.notes,
            created_at,
        }
    }
}

/// Pet creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPet {
    /// Owning client.
    pub client_id: Uuid,
    /// Pet name.
    pub name: String,
    /// Species, e.g. "pies".
    pub species: String,
    /// Breed.
    pub breed: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Body weight in kilograms.
    pub weight_kg: Option<f64>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Stored pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    /// Pet identifier.
    pub id: Uuid,
    /// Owning specialist.
    pub user_id: UserId,
    /// Owning client.
    pub client_id: Uuid,
    /// Pet name.
    pub name: String,
    /// Species.
    pub species: String,
    /// Breed.
    pub breed: Option<String>,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Body weight in kilograms.
    pub weight_kg: Option<f64>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl NewEntity for NewPet {
    type Record = Pet;
    const TABLE: &'static str = "pets";

    fn into_record(self, id: Uuid, owner: UserId, created_at: DateTime<Utc>) -> Pet {
        Pet {
            id,
            user_id: owner,
            client_id: self.client_id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            birth_date: self.birth_date,
            weight_kg: self.weight_kg,
            notes: self.notes,
            created_at,
        }
    }
}

/// Visit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Planned.
    #[default]
    Scheduled,
    /// Took place.
    Completed,
    /// Called off.
    Cancelled,
}

impl VisitStatus {
    /// Whether the visit counts as active in usage statistics.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Scheduled)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Visit creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    /// Visited pet.
    pub pet_id: Uuid,
    /// Pet owner.
    pub client_id: Uuid,
    /// Appointment time.
    pub visit_date: DateTime<Utc>,
    /// Kind of visit, e.g. "konsultacja".
    pub visit_type: String,
    /// Lifecycle state.
    pub status: VisitStatus,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Stored visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// Visit identifier.
    pub id: Uuid,
    /// Owning specialist.
    pub user_id: UserId,
    /// Visited pet.
    pub pet_id: Uuid,
    /// Pet owner.
    pub client_id: Uuid,
    /// Appointment time.
    pub visit_date: DateTime<Utc>,
    /// Kind of visit.
    pub visit_type: String,
    /// Lifecycle state.
    pub status: VisitStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Insert time.
    pub created_at: DateTime<Utc>,
}

impl NewEntity for NewVisit {
    type Record = Visit;
    const TABLE: &'static str = "visits";

    fn into_record(self, id: Uuid, owner: UserId, created_at: DateTime<Utc>) -> Visit {
        Visit {
            id,
            user_id: owner,
            pet_id: self.pet_id,
            client_id: self.client_id,
            visit_date: self.visit_date,
            visit_type: self.visit_type,
            status: self.status,
            notes: self.notes,
            created_at,
        }
    }
}
