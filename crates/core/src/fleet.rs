//! Plates and vehicle sets (conjuntos).

use crate::error::CoreError;
use crate::types::DbId;

pub const PLATE_TRACTOR: &str = "tractor";
pub const PLATE_TRAILER: &str = "trailer";

pub const VALID_PLATE_KINDS: &[&str] = &[PLATE_TRACTOR, PLATE_TRAILER];

/// A vehicle set carries at most this many trailers.
pub const MAX_TRAILERS: usize = 2;

pub fn validate_plate_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_PLATE_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid plate kind '{kind}'. Must be one of: {}",
            VALID_PLATE_KINDS.join(", ")
        )))
    }
}

/// The parts of a plate row needed to validate a vehicle composition.
#[derive(Debug, Clone)]
pub struct PlateRef<'a> {
    pub id: DbId,
    pub plate: &'a str,
    pub kind: &'a str,
}

/// Check a tractor + trailers composition.
///
/// The tractor slot must hold a tractor plate, every trailer slot a trailer
/// plate, no plate may repeat, and there are at most [`MAX_TRAILERS`]
/// trailers.
pub fn validate_vehicle_plates(
    tractor: &PlateRef<'_>,
    trailers: &[PlateRef<'_>],
) -> Result<(), CoreError> {
    if tractor.kind != PLATE_TRACTOR {
        return Err(CoreError::Validation(format!(
            "Plate {} is a {}, not a tractor",
            tractor.plate, tractor.kind
        )));
    }
    if trailers.len() > MAX_TRAILERS {
        return Err(CoreError::Validation(format!(
            "A vehicle set holds at most {MAX_TRAILERS} trailers"
        )));
    }
    for (i, trailer) in trailers.iter().enumerate() {
        if trailer.kind != PLATE_TRAILER {
            return Err(CoreError::Validation(format!(
                "Plate {} is a {}, not a trailer",
                trailer.plate, trailer.kind
            )));
        }
        if trailer.id == tractor.id || trailers[..i].iter().any(|t| t.id == trailer.id) {
            return Err(CoreError::Validation(format!(
                "Plate {} appears more than once",
                trailer.plate
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate(id: DbId, kind: &'static str) -> PlateRef<'static> {
        PlateRef { id, plate: "ABC1D23", kind }
    }

    #[test]
    fn tractor_with_two_trailers_is_valid() {
        let result = validate_vehicle_plates(
            &plate(1, PLATE_TRACTOR),
            &[plate(2, PLATE_TRAILER), plate(3, PLATE_TRAILER)],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn tractor_alone_is_valid() {
        assert!(validate_vehicle_plates(&plate(1, PLATE_TRACTOR), &[]).is_ok());
    }

    #[test]
    fn trailer_in_tractor_slot_is_rejected() {
        let err = validate_vehicle_plates(&plate(1, PLATE_TRAILER), &[]).unwrap_err();
        assert!(err.to_string().contains("not a tractor"));
    }

    #[test]
    fn three_trailers_are_rejected() {
        let trailers = [
            plate(2, PLATE_TRAILER),
            plate(3, PLATE_TRAILER),
            plate(4, PLATE_TRAILER),
        ];
        assert!(validate_vehicle_plates(&plate(1, PLATE_TRACTOR), &trailers).is_err());
    }

    #[test]
    fn repeated_trailer_is_rejected() {
        let trailers = [plate(2, PLATE_TRAILER), plate(2, PLATE_TRAILER)];
        let err = validate_vehicle_plates(&plate(1, PLATE_TRACTOR), &trailers).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn plate_kinds() {
        assert!(validate_plate_kind("tractor").is_ok());
        assert!(validate_plate_kind("bus").is_err());
    }
}
