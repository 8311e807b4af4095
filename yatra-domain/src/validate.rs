use std::collections::HashSet;

use crate::booking::{CreateBookingRequest, TransportType};
use crate::error::DomainError;

/// Coach-number policy for a transport type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachPolicy {
    Required,
    Forbidden,
}

/// Transport-specific rules, kept as a table so new transport types add a
/// row here instead of another conditional in the manager.
const TRANSPORT_RULES: &[(TransportType, CoachPolicy)] = &[
    (TransportType::Bus, CoachPolicy::Forbidden),
    (TransportType::Train, CoachPolicy::Required),
];

pub fn coach_policy(transport: TransportType) -> CoachPolicy {
    TRANSPORT_RULES
        .iter()
        .find(|(t, _)| *t == transport)
        .map(|(_, policy)| *policy)
        .unwrap_or(CoachPolicy::Forbidden)
}

/// Phone numbers must be Sri Lankan international format: `+94` followed
/// by exactly nine digits.
pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    let valid = phone
        .strip_prefix("+94")
        .is_some_and(|rest| rest.len() == 9 && rest.bytes().all(|b| b.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation(
            "Invalid phone number format. Use +94XXXXXXXXX".to_string(),
        ))
    }
}

pub fn validate_seat_set(seats: &[String]) -> Result<(), DomainError> {
    if seats.is_empty() {
        return Err(DomainError::Validation(
            "At least one seat must be selected".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for seat in seats {
        if seat.trim().is_empty() {
            return Err(DomainError::Validation("Seat labels must not be empty".to_string()));
        }
        if !seen.insert(seat.as_str()) {
            return Err(DomainError::Validation(format!("Duplicate seat label: {seat}")));
        }
    }
    Ok(())
}

pub fn validate_coach(
    transport: TransportType,
    coach_number: Option<&str>,
) -> Result<(), DomainError> {
    match (coach_policy(transport), coach_number) {
        (CoachPolicy::Required, None) => Err(DomainError::Validation(
            "Train booking requires coach number".to_string(),
        )),
        (CoachPolicy::Forbidden, Some(_)) => Err(DomainError::Validation(
            "Bus booking should not include coach number".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Structural checks for a new booking. Pure; no side effects on failure.
pub fn validate_create(req: &CreateBookingRequest) -> Result<(), DomainError> {
    if req.trip_id.trim().is_empty() {
        return Err(DomainError::Validation("Trip id is required".to_string()));
    }
    if req.from_location.trim().is_empty() || req.to_location.trim().is_empty() {
        return Err(DomainError::Validation("Missing booking details".to_string()));
    }
    validate_phone(&req.phone_number)?;
    validate_seat_set(&req.seat_numbers)?;
    validate_coach(req.transport_type, req.coach_number.as_deref())?;
    Ok(())
}
