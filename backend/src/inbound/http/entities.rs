//! Limit-guarded creation endpoints.
//!
//! ```text
//! POST /api/v1/users/{user_id}/clients
//! POST /api/v1/users/{user_id}/pets
//! POST /api/v1/users/{user_id}/visits
//! ```
//!
//! Requests are parsed into domain payloads here; the quota check and the
//! insert happen in the domain guards. A refusal surfaces as 403 with
//! `package_limit_exceeded` and the counts in `details`.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Client, Error, NewClient, NewPet, NewVisit, Pet, ScopedCreate, Visit};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, optional_text, parse_optional_date, parse_optional_positive,
    parse_rfc3339_timestamp, parse_user_id, parse_uuid, parse_visit_status, require_name,
};

/// Request payload for creating a client.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Stored client.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<Client> for ClientResponse {
    fn from(value: Client) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            address: value.address,
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for registering a pet.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    pub client_id: Option<String>,
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    /// `YYYY-MM-DD`.
    #[schema(example = "2021-05-14")]
    pub birth_date: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

/// Stored pet.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetResponse {
    pub id: String,
    pub user_id: String,
    pub client_id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<Pet> for PetResponse {
    fn from(value: Pet) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            client_id: value.client_id.to_string(),
            name: value.name,
            species: value.species,
            breed: value.breed,
            birth_date: value.birth_date.map(|date| date.format("%Y-%m-%d").to_string()),
            weight_kg: value.weight_kg,
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Request payload for scheduling a visit.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitRequest {
    pub pet_id: Option<String>,
    pub client_id: Option<String>,
    /// RFC 3339 appointment time.
    #[schema(example = "2026-03-02T09:30:00Z")]
    pub visit_date: Option<String>,
    pub visit_type: Option<String>,
    /// Defaults to `scheduled`.
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Stored visit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub id: String,
    pub user_id: String,
    pub pet_id: String,
    pub client_id: String,
    pub visit_date: String,
    pub visit_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<Visit> for VisitResponse {
    fn from(value: Visit) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            pet_id: value.pet_id.to_string(),
            client_id: value.client_id.to_string(),
            visit_date: value.visit_date.to_rfc3339(),
            visit_type: value.visit_type,
            status: value.status.as_str().to_owned(),
            notes: value.notes,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

fn required_uuid(value: Option<&str>, field: FieldName) -> Result<uuid::Uuid, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    parse_uuid(raw, field)
}

fn parse_client_request(payload: CreateClientRequest) -> Result<NewClient, Error> {
    Ok(NewClient {
        first_name: require_name(payload.first_name, FieldName::new("firstName"))?,
        last_name: require_name(payload.last_name, FieldName::new("lastName"))?,
        email: optional_text(payload.email),
        phone: optional_text(payload.phone),
        address: optional_text(payload.address),
        notes: optional_text(payload.notes),
    })
}

fn parse_pet_request(payload: CreatePetRequest) -> Result<NewPet, Error> {
    Ok(NewPet {
        client_id: required_uuid(payload.client_id.as_deref(), FieldName::new("clientId"))?,
        name: require_name(payload.name, FieldName::new("name"))?,
        species: require_name(payload.species, FieldName::new("species"))?,
        breed: optional_text(payload.breed),
        birth_date: parse_optional_date(
            payload.birth_date.as_deref(),
            FieldName::new("birthDate"),
        )?,
        weight_kg: parse_optional_positive(payload.weight_kg, FieldName::new("weightKg"))?,
        notes: optional_text(payload.notes),
    })
}

fn parse_visit_request(payload: CreateVisitRequest) -> Result<NewVisit, Error> {
    let visit_date_field = FieldName::new("visitDate");
    let visit_date = payload
        .visit_date
        .as_deref()
        .ok_or_else(|| missing_field_error(visit_date_field))?;
    Ok(NewVisit {
        pet_id: required_uuid(payload.pet_id.as_deref(), FieldName::new("petId"))?,
        client_id: required_uuid(payload.client_id.as_deref(), FieldName::new("clientId"))?,
        visit_date: parse_rfc3339_timestamp(visit_date, visit_date_field)?,
        visit_type: require_name(payload.visit_type, FieldName::new("visitType"))?,
        status: parse_visit_status(payload.status.as_deref())?,
        notes: optional_text(payload.notes),
    })
}

/// Create a client if the package has room.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/clients",
    params(("user_id" = String, Path, description = "Specialist identifier")),
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Client limit reached", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entities"],
    operation_id = "createClient"
)]
#[post("/users/{user_id}/clients")]
pub async fn create_client(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreateClientRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner())?;
    let new_client = parse_client_request(payload.into_inner())?;
    let client = state
        .entities
        .clients
        .create(ScopedCreate::new(user_id, new_client))
        .await?;
    Ok(HttpResponse::Created().json(ClientResponse::from(client)))
}

/// Register a pet if the package has room.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/pets",
    params(("user_id" = String, Path, description = "Specialist identifier")),
    request_body = CreatePetRequest,
    responses(
        (status = 201, description = "Pet created", body = PetResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Pet limit reached", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entities"],
    operation_id = "createPet"
)]
#[post("/users/{user_id}/pets")]
pub async fn create_pet(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreatePetRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner())?;
    let new_pet = parse_pet_request(payload.into_inner())?;
    let pet = state
        .entities
        .pets
        .create(ScopedCreate::new(user_id, new_pet))
        .await?;
    Ok(HttpResponse::Created().json(PetResponse::from(pet)))
}

/// Schedule a visit; visits count against the pet quota.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/visits",
    params(("user_id" = String, Path, description = "Specialist identifier")),
    request_body = CreateVisitRequest,
    responses(
        (status = 201, description = "Visit created", body = VisitResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Pet limit reached", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entities"],
    operation_id = "createVisit"
)]
#[post("/users/{user_id}/visits")]
pub async fn create_visit(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreateVisitRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner())?;
    let new_visit = parse_visit_request(payload.into_inner())?;
    let visit = state
        .entities
        .visits
        .create(ScopedCreate::new(user_id, new_visit))
        .await?;
    Ok(HttpResponse::Created().json(VisitResponse::from(visit)))
}

#[cfg(test)]
#[path = "entities_tests.rs"]
mod tests;
