//! Villa domain model.
//!
//! This module contains the storage shape of a villa record, the identifier
//! newtype assigned by the record store, and the timestamp value object.

use chrono::{DateTime, Utc};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Identifier of a villa record.
///
/// Identifiers are assigned by the record store on insert and are strictly
/// positive. The value `0` means "not assigned" and never names a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VillaId(i32);

impl VillaId {
    /// The "not assigned" identifier.
    pub const UNASSIGNED: Self = Self(0);

    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Returns `true` for the "not assigned" identifier.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == Self::UNASSIGNED.0
    }
}

impl std::fmt::Display for VillaId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: reads the system clock. Handlers capture it once per request
    /// and pass it down.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

// =============================================================================
// Villa
// =============================================================================

/// A villa as persisted by the record store.
///
/// The timestamps belong to the storage shape only; they never cross the
/// HTTP boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Villa {
    /// Store-assigned identifier.
    pub id: VillaId,
    /// Display name, unique case-insensitively at creation time.
    pub name: String,
    /// Free-text description.
    pub details: Option<String>,
    /// Nightly rate.
    pub rate: f64,
    /// Floor area in square feet.
    pub sqft: i32,
    /// Maximum number of guests.
    pub occupancy: i32,
    /// Picture location, not validated.
    pub image_url: Option<String>,
    /// Free-text amenity list.
    pub amenity: Option<String>,
    /// When the record was inserted.
    pub created_at: Timestamp,
    /// When the record was last replaced or patched.
    pub updated_at: Timestamp,
}

impl Villa {
    /// Case-insensitive name comparison used by the duplicate check.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

// =============================================================================
// NewVilla
// =============================================================================

/// The attributes of a villa that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVilla {
    pub name: String,
    pub details: Option<String>,
    pub rate: f64,
    pub sqft: i32,
    pub occupancy: i32,
    pub image_url: Option<String>,
    pub amenity: Option<String>,
}

impl NewVilla {
    /// Attaches the store-assigned identifier and the insert time.
    ///
    /// Both timestamps start out equal.
    #[must_use]
    pub fn into_villa(self, id: VillaId, timestamp: Timestamp) -> Villa {
        Villa {
            id,
            name: self.name,
            details: self.details,
            rate: self.rate,
            sqft: self.sqft,
            occupancy: self.occupancy,
            image_url: self.image_url,
            amenity: self.amenity,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
