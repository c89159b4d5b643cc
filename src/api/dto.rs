//! Data Transfer Objects for API requests and responses.
//!
//! The transfer shape (`VillaDto`) and the creation shape (`VillaCreateDto`)
//! are kept separate from the storage shape in `domain`. Each direction of
//! the mapping is one explicit function:
//!
//! - storage → transfer: `VillaDto::from(&Villa)`
//! - transfer → storage: `VillaDto::into_villa`
//! - creation → new record: `NewVilla::from(VillaCreateDto)`

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::domain::{NewVilla, Timestamp, Villa, VillaId};

/// Longest accepted villa name, in characters.
pub const MAX_NAME_LENGTH: usize = 30;

// =============================================================================
// Villa DTOs
// =============================================================================

/// Transfer shape of a villa: read responses, full update bodies and the
/// target of patch application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillaDto {
    /// Villa identifier.
    #[serde(default)]
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub details: Option<String>,
    /// Nightly rate.
    pub rate: f64,
    /// Floor area in square feet.
    #[serde(default)]
    pub sqft: i32,
    /// Maximum number of guests.
    #[serde(default)]
    pub occupancy: i32,
    /// Picture location.
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    /// Free-text amenity list.
    #[serde(default)]
    pub amenity: Option<String>,
}

impl From<&Villa> for VillaDto {
    fn from(villa: &Villa) -> Self {
        Self {
            id: villa.id.get(),
            name: villa.name.clone(),
            details: villa.details.clone(),
            rate: villa.rate,
            sqft: villa.sqft,
            occupancy: villa.occupancy,
            image_url: villa.image_url.clone(),
            amenity: villa.amenity.clone(),
        }
    }
}

impl VillaDto {
    /// Maps the transfer shape back to the storage shape.
    ///
    /// The timestamps are not part of the transfer shape, so the caller
    /// supplies them.
    #[must_use]
    pub fn into_villa(self, created_at: Timestamp, updated_at: Timestamp) -> Villa {
        Villa {
            id: VillaId::new(self.id),
            name: self.name,
            details: self.details,
            rate: self.rate,
            sqft: self.sqft,
            occupancy: self.occupancy,
            image_url: self.image_url,
            amenity: self.amenity,
            created_at,
            updated_at,
        }
    }

    /// Validates every field and returns the normalized DTO.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every failing field.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let name = validate_fields(&self.name, self.rate, self.sqft, self.occupancy)?;
        Ok(Self { name, ..self })
    }
}

/// Creation shape of a villa.
///
/// The identifier is assigned by the store. `id` is accepted on the wire only
/// so that a caller-supplied identifier can be rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillaCreateDto {
    /// Caller-supplied identifier; must be absent or zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub details: Option<String>,
    /// Nightly rate.
    pub rate: f64,
    /// Floor area in square feet.
    #[serde(default)]
    pub sqft: i32,
    /// Maximum number of guests.
    #[serde(default)]
    pub occupancy: i32,
    /// Picture location.
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    /// Free-text amenity list.
    #[serde(default)]
    pub amenity: Option<String>,
}

impl VillaCreateDto {
    /// Returns `true` if the caller tried to choose the identifier.
    #[must_use]
    pub fn has_client_id(&self) -> bool {
        self.id.is_some_and(|id| id != 0)
    }

    /// Validates every field and returns the normalized DTO.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every failing field.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let name = validate_fields(&self.name, self.rate, self.sqft, self.occupancy)?;
        Ok(Self { name, ..self })
    }
}

impl From<VillaCreateDto> for NewVilla {
    fn from(dto: VillaCreateDto) -> Self {
        Self {
            name: dto.name,
            details: dto.details,
            rate: dto.rate,
            sqft: dto.sqft,
            occupancy: dto.occupancy,
            image_url: dto.image_url,
            amenity: dto.amenity,
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a villa name and returns it trimmed.
///
/// # Validation Rules
///
/// - Name must not be blank
/// - Name must not exceed [`MAX_NAME_LENGTH`] characters
///
/// # Errors
///
/// Returns a single-field `ValidationError` on failure.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::single("name", "Name is required"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::single(
            "name",
            format!("Name must not exceed {MAX_NAME_LENGTH} characters"),
        ));
    }

    Ok(name.to_string())
}

/// Validates a nightly rate: finite and not negative.
///
/// # Errors
///
/// Returns a single-field `ValidationError` on failure.
pub fn validate_rate(rate: f64) -> Result<f64, ValidationError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ValidationError::single("rate", "Rate must not be negative"));
    }
    Ok(rate)
}

/// Validates a count-like field (`sqft`, `occupancy`).
///
/// # Errors
///
/// Returns a single-field `ValidationError` on failure.
pub fn validate_non_negative(field: &str, value: i32) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::single(
            field,
            format!("{field} must not be negative"),
        ));
    }
    Ok(value)
}

/// Runs every field rule and collects all failures.
fn validate_fields(
    name: &str,
    rate: f64,
    sqft: i32,
    occupancy: i32,
) -> Result<String, ValidationError> {
    let mut errors = ValidationError::default();

    let name = match validate_name(name) {
        Ok(name) => Some(name),
        Err(error) => {
            errors.extend(error);
            None
        }
    };
    if let Err(error) = validate_rate(rate) {
        errors.extend(error);
    }
    if let Err(error) = validate_non_negative("sqft", sqft) {
        errors.extend(error);
    }
    if let Err(error) = validate_non_negative("occupancy", occupancy) {
        errors.extend(error);
    }

    match name {
        Some(name) if errors.is_empty() => Ok(name),
        _ => Err(errors),
    }
}

// =============================================================================
// Tests
// =============================================================================
