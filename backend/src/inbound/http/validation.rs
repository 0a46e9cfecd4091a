//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes [`Error::invalid_request`] with `field`, `code` and,
//! where useful, the offending `value` in the details.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{ActionType, Error, UserId, VisitStatus};

/// Longest accepted name, in characters.
pub(crate) const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    MissingField,
    InvalidUuid,
    InvalidUserId,
    InvalidActionType,
    InvalidTimestamp,
    InvalidDate,
    InvalidLength,
    InvalidNumber,
    InvalidVisitStatus,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidUserId => "invalid_user_id",
            Self::InvalidActionType => "invalid_action_type",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidDate => "invalid_date",
            Self::InvalidLength => "invalid_length",
            Self::InvalidNumber => "invalid_number",
            Self::InvalidVisitStatus => "invalid_visit_status",
        }
    }
}

/// Newtype wrapper for request field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid(field: FieldName, message: String, code: ValidationCode, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({ "field": field.as_str(), "value": value, "code": code.as_str() }),
        None => json!({ "field": field.as_str(), "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    invalid(
        field,
        format!("missing required field: {}", field.as_str()),
        ValidationCode::MissingField,
        None,
    )
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        invalid(
            FieldName::new("userId"),
            err.to_string(),
            ValidationCode::InvalidUserId,
            Some(raw),
        )
    })
}

pub(crate) fn parse_action_type(raw: &str) -> Result<ActionType, Error> {
    raw.parse().map_err(|_| {
        invalid(
            FieldName::new("action"),
            "action must be one of clients, pets, services, specializations".to_owned(),
            ValidationCode::InvalidActionType,
            Some(raw),
        )
    })
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        invalid(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ValidationCode::InvalidUuid,
            Some(value),
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            invalid(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                ValidationCode::InvalidTimestamp,
                Some(value),
            )
        })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                invalid(
                    field,
                    format!("{} must be a YYYY-MM-DD date", field.as_str()),
                    ValidationCode::InvalidDate,
                    Some(raw),
                )
            })
        })
        .transpose()
}

/// Trim a required name and enforce its length bounds.
pub(crate) fn require_name(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let trimmed = value
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(invalid(
            field,
            format!("{} must be at most {MAX_NAME_CHARS} characters", field.as_str()),
            ValidationCode::InvalidLength,
            None,
        ));
    }
    Ok(trimmed.to_owned())
}

/// Accept only finite, strictly positive measurements.
pub(crate) fn parse_optional_positive(
    value: Option<f64>,
    field: FieldName,
) -> Result<Option<f64>, Error> {
    match value {
        Some(number) if !number.is_finite() || number <= 0.0 => Err(invalid(
            field,
            format!("{} must be a positive number", field.as_str()),
            ValidationCode::InvalidNumber,
            Some(&number.to_string()),
        )),
        other => Ok(other),
    }
}

/// Parse a visit status, defaulting to `scheduled`.
pub(crate) fn parse_visit_status(value: Option<&str>) -> Result<VisitStatus, Error> {
    let field = FieldName::new("status");
    match value {
        None => Ok(VisitStatus::default()),
        Some("scheduled") => Ok(VisitStatus::Scheduled),
        Some("completed") => Ok(VisitStatus::Completed),
        Some("cancelled") => Ok(VisitStatus::Cancelled),
        Some(other) => Err(invalid(
            field,
            "status must be one of scheduled, completed, cancelled".to_owned(),
            ValidationCode::InvalidVisitStatus,
            Some(other),
        )),
    }
}

/// Trim optional free text, mapping blanks to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
