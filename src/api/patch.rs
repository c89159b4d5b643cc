//! Partial updates of a villa.
//!
//! A patch document is a JSON array of operations, wire-compatible with the
//! subset of RFC 6902 that villa clients send:
//!
//! ```json
//! [
//!   { "op": "replace", "path": "/rate", "value": 150 },
//!   { "op": "remove", "path": "/amenity" }
//! ]
//! ```
//!
//! Operations are applied in order to a field-value map built from the
//! transfer shape. A failing operation records a field error and is skipped;
//! the remaining operations still run, and the patched villa is then checked
//! against the field rules, so operation errors and rule violations come
//! back together.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::dto::VillaDto;
use super::error::ValidationError;

// =============================================================================
// Patch Operations
// =============================================================================

/// One field-level mutation.
///
/// Any `op` outside this set (`move`, `copy`, `test`) fails deserialization
/// and the whole body is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Sets a field. `"set"` is accepted as a synonym of `"add"`.
    #[serde(alias = "set")]
    Add {
        path: String,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
    /// Resets a field to its default.
    Remove { path: String },
    /// Replaces a field.
    Replace {
        path: String,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
}

/// Keeps an explicit `null` apart from a missing member.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    /// The JSON pointer this operation targets.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Remove { path } | Self::Replace { path, .. } => path,
        }
    }
}

// =============================================================================
// Patchable Fields
// =============================================================================

/// A field of the transfer shape addressed by a patch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VillaField {
    Id,
    Name,
    Details,
    Rate,
    Sqft,
    Occupancy,
    ImageUrl,
    Amenity,
}

impl VillaField {
    /// Resolves a single-segment JSON pointer such as `/imageUrl`.
    ///
    /// Matching ignores case and underscores, so `/image_url`, `/imageUrl`
    /// and `/ImageUrl` name the same field.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let segment = path.strip_prefix('/')?;
        if segment.contains('/') {
            return None;
        }

        let normalized: String = segment
            .chars()
            .filter(|character| *character != '_')
            .map(|character| character.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "details" => Some(Self::Details),
            "rate" => Some(Self::Rate),
            "sqft" => Some(Self::Sqft),
            "occupancy" => Some(Self::Occupancy),
            "imageurl" => Some(Self::ImageUrl),
            "amenity" => Some(Self::Amenity),
            _ => None,
        }
    }

    /// Key of this field in the serialized transfer shape.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Details => "details",
            Self::Rate => "rate",
            Self::Sqft => "sqft",
            Self::Occupancy => "occupancy",
            Self::ImageUrl => "image_url",
            Self::Amenity => "amenity",
        }
    }

    /// The value a `remove` leaves behind.
    fn default_value(self) -> Value {
        match self {
            Self::Name => Value::String(String::new()),
            Self::Details | Self::ImageUrl | Self::Amenity => Value::Null,
            Self::Id | Self::Rate | Self::Sqft | Self::Occupancy => Value::from(0),
        }
    }

    /// Whether `value` has the JSON type this field stores.
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Name => value.is_string(),
            Self::Details | Self::ImageUrl | Self::Amenity => {
                value.is_string() || value.is_null()
            }
            Self::Rate => value.is_number(),
            Self::Id | Self::Sqft | Self::Occupancy => value
                .as_i64()
                .is_some_and(|number| i32::try_from(number).is_ok()),
        }
    }
}

// =============================================================================
// Application
// =============================================================================

/// Applies `operations` to a copy of `target` and validates the result.
///
/// The identifier cannot be patched. Skipped operations leave their field
/// as it was, so the field rules run on whatever did apply.
///
/// # Errors
///
/// Returns every operation error, keyed by the operation path, followed by
/// every field rule the patched villa violates, keyed by field name.
pub fn apply_patch(
    target: &VillaDto,
    operations: &[PatchOperation],
) -> Result<VillaDto, ValidationError> {
    let mut fields = to_fields(target);
    let mut errors = ValidationError::default();

    for operation in operations {
        if let Err(message) = apply_operation(&mut fields, operation) {
            errors.push(operation.path(), message);
        }
    }

    let patched: VillaDto = serde_json::from_value(Value::Object(fields))
        .map_err(|error| ValidationError::single("body", error.to_string()))?;

    match patched.validated() {
        Ok(patched) => errors.into_result().map(|()| patched),
        Err(violations) => {
            errors.extend(violations);
            Err(errors)
        }
    }
}

fn apply_operation(
    fields: &mut Map<String, Value>,
    operation: &PatchOperation,
) -> Result<(), String> {
    let path = operation.path();
    let field = VillaField::from_path(path).ok_or_else(|| {
        format!("The target location specified by path '{path}' was not found")
    })?;

    if field == VillaField::Id {
        return Err("The villa identifier cannot be changed".to_string());
    }

    let value = match operation {
        PatchOperation::Remove { .. } => field.default_value(),
        PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => {
            let value = value
                .clone()
                .ok_or_else(|| format!("A value is required to patch '{path}'"))?;
            if !field.accepts(&value) {
                return Err(format!(
                    "The value '{value}' is invalid for target location '{path}'"
                ));
            }
            value
        }
    };

    fields.insert(field.key().to_string(), value);
    Ok(())
}

/// Builds the field-value map of the transfer shape.
fn to_fields(dto: &VillaDto) -> Map<String, Value> {
    let optional = |value: &Option<String>| value.clone().map_or(Value::Null, Value::from);

    let mut fields = Map::new();
    fields.insert(VillaField::Id.key().to_string(), Value::from(dto.id));
    fields.insert(VillaField::Name.key().to_string(), Value::from(dto.name.clone()));
    fields.insert(VillaField::Details.key().to_string(), optional(&dto.details));
    fields.insert(VillaField::Rate.key().to_string(), Value::from(dto.rate));
    fields.insert(VillaField::Sqft.key().to_string(), Value::from(dto.sqft));
    fields.insert(VillaField::Occupancy.key().to_string(), Value::from(dto.occupancy));
    fields.insert(VillaField::ImageUrl.key().to_string(), optional(&dto.image_url));
    fields.insert(VillaField::Amenity.key().to_string(), optional(&dto.amenity));
    fields
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn villa() -> VillaDto {
        VillaDto {
            id: 1,
            name: "Pool House".to_string(),
            details: Some("Next to the pool".to_string()),
            rate: 100.0,
            sqft: 500,
            occupancy: 2,
            image_url: None,
            amenity: Some("Sauna".to_string()),
        }
    }

    fn operations(document: Value) -> Vec<PatchOperation> {
        serde_json::from_value(document).unwrap()
    }

    // -------------------------------------------------------------------------
    // Deserialization
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_deserialize_operations() {
        let parsed = operations(json!([
            { "op": "add", "path": "/details", "value": "x" },
            { "op": "set", "path": "/details", "value": null },
            { "op": "remove", "path": "/amenity" },
            { "op": "replace", "path": "/rate" },
        ]));

        assert_eq!(
            parsed,
            vec![
                PatchOperation::Add {
                    path: "/details".to_string(),
                    value: Some(json!("x")),
                },
                PatchOperation::Add {
                    path: "/details".to_string(),
                    value: Some(Value::Null),
                },
                PatchOperation::Remove {
                    path: "/amenity".to_string(),
                },
                PatchOperation::Replace {
                    path: "/rate".to_string(),
                    value: None,
                },
            ]
        );
    }

    #[rstest]
    #[case(json!([{ "op": "move", "from": "/name", "path": "/details" }]))]
    #[case(json!([{ "op": "test", "path": "/name", "value": "x" }]))]
    #[case(json!([{ "path": "/name", "value": "x" }]))]
    #[case(json!(null))]
    fn test_deserialize_rejects_unsupported_documents(#[case] document: Value) {
        let result: Result<Vec<PatchOperation>, _> = serde_json::from_value(document);
        assert!(result.is_err());
    }

    // -------------------------------------------------------------------------
    // Path Resolution
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("/name", Some(VillaField::Name))]
    #[case("/Name", Some(VillaField::Name))]
    #[case("/imageUrl", Some(VillaField::ImageUrl))]
    #[case("/image_url", Some(VillaField::ImageUrl))]
    #[case("/ImageUrl", Some(VillaField::ImageUrl))]
    #[case("/SQFT", Some(VillaField::Sqft))]
    #[case("/id", Some(VillaField::Id))]
    #[case("name", None)]
    #[case("/", None)]
    #[case("/name/first", None)]
    #[case("/owner", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<VillaField>) {
        assert_eq!(VillaField::from_path(path), expected);
    }

    // -------------------------------------------------------------------------
    // Application
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_replace_changes_only_the_named_field(villa: VillaDto) {
        let patched = apply_patch(
            &villa,
            &operations(json!([{ "op": "replace", "path": "/rate", "value": 150 }])),
        )
        .unwrap();

        assert_eq!(
            patched,
            VillaDto {
                rate: 150.0,
                ..villa
            }
        );
    }

    #[rstest]
    fn test_operations_apply_in_order(villa: VillaDto) {
        let patched = apply_patch(
            &villa,
            &operations(json!([
                { "op": "replace", "path": "/occupancy", "value": 4 },
                { "op": "replace", "path": "/occupancy", "value": 6 },
                { "op": "add", "path": "/imageUrl", "value": "https://example.com/v.png" },
            ])),
        )
        .unwrap();

        assert_eq!(patched.occupancy, 6);
        assert_eq!(
            patched.image_url,
            Some("https://example.com/v.png".to_string())
        );
    }

    #[rstest]
    fn test_remove_resets_to_default(villa: VillaDto) {
        let patched = apply_patch(
            &villa,
            &operations(json!([
                { "op": "remove", "path": "/amenity" },
                { "op": "remove", "path": "/sqft" },
            ])),
        )
        .unwrap();

        assert_eq!(patched.amenity, None);
        assert_eq!(patched.sqft, 0);
    }

    #[rstest]
    fn test_remove_name_fails_validation(villa: VillaDto) {
        let error = apply_patch(
            &villa,
            &operations(json!([{ "op": "remove", "path": "/name" }])),
        )
        .unwrap_err();

        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.errors[0].field, "name");
    }

    #[rstest]
    fn test_operation_and_rule_errors_are_reported_together(villa: VillaDto) {
        let error = apply_patch(
            &villa,
            &operations(json!([
                { "op": "replace", "path": "/rate", "value": "cheap" },
                { "op": "replace", "path": "/occupancy", "value": -1 },
            ])),
        )
        .unwrap_err();

        let fields: Vec<&str> = error
            .errors
            .iter()
            .map(|error| error.field.as_str())
            .collect();
        assert_eq!(fields, vec!["/rate", "occupancy"]);
    }

    #[rstest]
    fn test_patched_name_is_trimmed(villa: VillaDto) {
        let patched = apply_patch(
            &villa,
            &operations(json!([{ "op": "replace", "path": "/name", "value": "  Loft " }])),
        )
        .unwrap();

        assert_eq!(patched.name, "Loft");
    }

    #[rstest]
    fn test_explicit_null_clears_optional_field(villa: VillaDto) {
        let patched = apply_patch(
            &villa,
            &operations(json!([{ "op": "replace", "path": "/details", "value": null }])),
        )
        .unwrap();

        assert_eq!(patched.details, None);
    }

    #[rstest]
    fn test_errors_are_collected_per_operation(villa: VillaDto) {
        let error = apply_patch(
            &villa,
            &operations(json!([
                { "op": "replace", "path": "/owner", "value": "me" },
                { "op": "replace", "path": "/id", "value": 9 },
                { "op": "replace", "path": "/rate", "value": "cheap" },
                { "op": "replace", "path": "/name", "value": null },
                { "op": "add", "path": "/sqft" },
                { "op": "replace", "path": "/occupancy", "value": 3 },
            ])),
        )
        .unwrap_err();

        let paths: Vec<&str> = error
            .errors
            .iter()
            .map(|error| error.field.as_str())
            .collect();
        assert_eq!(paths, vec!["/owner", "/id", "/rate", "/name", "/sqft"]);
    }

    #[rstest]
    #[case(json!(2.5))]
    #[case(json!(4_000_000_000_i64))]
    #[case(json!("3"))]
    fn test_integer_fields_reject_non_i32(villa: VillaDto, #[case] value: Value) {
        let result = apply_patch(
            &villa,
            &[PatchOperation::Replace {
                path: "/occupancy".to_string(),
                value: Some(value),
            }],
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_empty_document_is_identity(villa: VillaDto) {
        assert_eq!(apply_patch(&villa, &[]).unwrap(), villa);
    }
}
