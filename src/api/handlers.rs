//! HTTP handlers for the Villa API.
//!
//! Every handler follows the same shape: reject malformed input before the
//! store is touched, validate fields, then run the repository future. Domain
//! values never leave this module; responses carry the transfer shape.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
};

use super::dto::{VillaCreateDto, VillaDto};
use super::error::ApiErrorResponse;
use super::patch::{PatchOperation, apply_patch};
use super::routes::VILLAS_PATH;
use crate::domain::{NewVilla, Timestamp, Villa, VillaId};
use crate::infrastructure::{Repositories, VillaRepository};

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The repository is a trait object so the backend can be chosen at startup
/// by `RepositoryFactory`.
#[derive(Clone)]
pub struct AppState {
    /// Villa repository for persistence.
    pub villa_repository: Arc<dyn VillaRepository + Send + Sync>,
}

impl AppState {
    /// Creates a new `AppState` from initialized repositories.
    #[must_use]
    pub fn from_repositories(repositories: Repositories) -> Self {
        Self {
            villa_repository: repositories.villa_repository,
        }
    }
}

// =============================================================================
// GET /villas
// =============================================================================

/// Lists every villa.
///
/// # Response
///
/// - **200 OK**: JSON array, empty when there are no villas
///
/// # Errors
///
/// Returns 500 Internal Server Error if the store fails.
pub async fn list_villas(
    State(state): State<AppState>,
) -> Result<Json<Vec<VillaDto>>, ApiErrorResponse> {
    let villas = state.villa_repository.find_all().await?;
    tracing::debug!(count = villas.len(), "Listed villas");

    Ok(Json(villas.iter().map(VillaDto::from).collect()))
}

// =============================================================================
// GET /villas/{id}
// =============================================================================

/// Fetches a single villa.
///
/// # Errors
///
/// - 400 Bad Request: `id` is zero
/// - 404 Not Found: no villa has this identifier
/// - 500 Internal Server Error: store failure
pub async fn get_villa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VillaDto>, ApiErrorResponse> {
    let id = require_assigned(id)?;
    let villa = find_existing(&state, id).await?;
    tracing::debug!(villa_id = %id, "Fetched villa");

    Ok(Json(VillaDto::from(&villa)))
}

// =============================================================================
// POST /villas
// =============================================================================

/// 201 response: status, `Location` header and the stored villa.
pub type Created = (StatusCode, [(header::HeaderName, String); 1], Json<VillaDto>);

/// Creates a villa.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Pool House",
///   "details": "Next to the pool",
///   "rate": 100,
///   "sqft": 500,
///   "occupancy": 2,
///   "imageUrl": "https://example.com/pool.png",
///   "amenity": "Sauna"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the stored villa, with `Location: /villas/{id}`
///
/// # Errors
///
/// Checked in this order:
/// - 400 Bad Request: missing, null or unparsable body
/// - 400 Bad Request: field validation failed
/// - 400 Bad Request: a villa with the same name exists (case-insensitive)
/// - 500 Internal Server Error: the body carried a non-zero `id`
/// - 500 Internal Server Error: store failure
pub async fn create_villa(
    State(state): State<AppState>,
    payload: Result<Json<VillaCreateDto>, JsonRejection>,
) -> Result<Created, ApiErrorResponse> {
    let Json(request) = payload?;
    let request = request.validated()?;

    if state
        .villa_repository
        .find_by_name(&request.name)
        .await?
        .is_some()
    {
        tracing::info!(name = %request.name, "Rejected duplicate villa name");
        return Err(ApiErrorResponse::duplicate_name());
    }

    if request.has_client_id() {
        tracing::warn!(id = ?request.id, "Rejected caller-supplied villa id");
        return Err(ApiErrorResponse::server_rejected(
            "Villa id is assigned by the server",
        ));
    }

    let villa = state
        .villa_repository
        .insert(NewVilla::from(request), Timestamp::now())
        .await?;
    tracing::info!(villa_id = %villa.id, name = %villa.name, "Created villa");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, villa_location(villa.id))],
        Json(VillaDto::from(&villa)),
    ))
}

// =============================================================================
// DELETE /villas/{id}
// =============================================================================

/// Deletes a villa.
///
/// # Errors
///
/// - 400 Bad Request: `id` is zero
/// - 404 Not Found: no villa has this identifier
/// - 500 Internal Server Error: store failure
pub async fn delete_villa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiErrorResponse> {
    let id = require_assigned(id)?;

    if !state.villa_repository.delete(id).await? {
        return Err(villa_not_found(id));
    }
    tracing::info!(villa_id = %id, "Deleted villa");

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// PUT /villas/{id}
// =============================================================================

/// Replaces every attribute of a villa.
///
/// The body `id` must equal the path `id`. `created_at` is kept from the
/// stored record and `updated_at` is refreshed.
///
/// # Errors
///
/// - 400 Bad Request: missing, null or unparsable body, `id` is zero, or the
///   body `id` differs from the path
/// - 400 Bad Request: field validation failed
/// - 404 Not Found: no villa has this identifier
/// - 500 Internal Server Error: store failure
pub async fn update_villa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<VillaDto>, JsonRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let Json(request) = payload?;
    let id = require_assigned(id)?;
    if request.id != id.get() {
        return Err(ApiErrorResponse::malformed_input(format!(
            "Body id {} does not match path id {id}",
            request.id
        )));
    }
    let request = request.validated()?;

    let existing = find_existing(&state, id).await?;
    save(&state, request.into_villa(existing.created_at, Timestamp::now())).await?;
    tracing::info!(villa_id = %id, "Updated villa");

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// PATCH /villas/{id}
// =============================================================================

/// Applies a list of patch operations to a villa.
///
/// Nothing is persisted unless every operation applied and the patched villa
/// passes validation.
///
/// # Request Body
///
/// ```json
/// [{ "op": "replace", "path": "/rate", "value": 150 }]
/// ```
///
/// # Errors
///
/// - 400 Bad Request: missing, null or unparsable body, or `id` is zero
/// - 404 Not Found: no villa has this identifier
/// - 400 Bad Request: an operation failed or the result is invalid
/// - 500 Internal Server Error: store failure
pub async fn update_partial_villa(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<Vec<PatchOperation>>, JsonRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let Json(operations) = payload?;
    let id = require_assigned(id)?;

    let existing = find_existing(&state, id).await?;
    let patched = apply_patch(&VillaDto::from(&existing), &operations).inspect_err(|error| {
        tracing::info!(villa_id = %id, errors = error.errors.len(), "Rejected villa patch");
    })?;

    save(&state, patched.into_villa(existing.created_at, Timestamp::now())).await?;
    tracing::info!(villa_id = %id, operations = operations.len(), "Patched villa");

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// GET /health
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of stored villas.
    pub villas: u64,
}

/// Health check endpoint.
///
/// Counting the villas doubles as a store connectivity probe.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "villas": 3 }
/// ```
///
/// # Errors
///
/// Returns 500 Internal Server Error if the store cannot be reached.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiErrorResponse> {
    let villas = state.villa_repository.count().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        villas,
    }))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Rejects the unassigned identifier `0`.
fn require_assigned(id: i32) -> Result<VillaId, ApiErrorResponse> {
    let id = VillaId::new(id);
    if id.is_unassigned() {
        return Err(ApiErrorResponse::malformed_input("Villa id must not be 0"));
    }
    Ok(id)
}

async fn find_existing(state: &AppState, id: VillaId) -> Result<Villa, ApiErrorResponse> {
    state
        .villa_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| villa_not_found(id))
}

/// Writes `villa` back; a record deleted since it was loaded is a 404.
async fn save(state: &AppState, villa: Villa) -> Result<(), ApiErrorResponse> {
    if state.villa_repository.update(&villa).await? {
        Ok(())
    } else {
        Err(villa_not_found(villa.id))
    }
}

fn villa_not_found(id: VillaId) -> ApiErrorResponse {
    ApiErrorResponse::not_found(format!("Villa {id} not found"))
}

/// Location of a stored villa, e.g. `/villas/7`.
#[must_use]
pub fn villa_location(id: VillaId) -> String {
    format!("{VILLAS_PATH}/{id}")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryVillaRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> AppState {
        AppState {
            villa_repository: Arc::new(InMemoryVillaRepository::new()),
        }
    }

    fn pool_house() -> VillaCreateDto {
        VillaCreateDto {
            id: None,
            name: "Pool House".to_string(),
            details: None,
            rate: 100.0,
            sqft: 500,
            occupancy: 2,
            image_url: None,
            amenity: None,
        }
    }

    #[rstest]
    #[case(1, true)]
    #[case(-3, true)]
    #[case(0, false)]
    fn test_require_assigned(#[case] id: i32, #[case] accepted: bool) {
        assert_eq!(require_assigned(id).is_ok(), accepted);
    }

    #[rstest]
    fn test_villa_location() {
        assert_eq!(villa_location(VillaId::new(7)), "/villas/7");
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_villa_sets_location(state: AppState) {
        let (status, headers, Json(body)) = create_villa(State(state), Ok(Json(pool_house())))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.id, 1);
        assert_eq!(headers[0].1, "/villas/1");
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_villa_validates_before_duplicate_check(state: AppState) {
        create_villa(State(state.clone()), Ok(Json(pool_house())))
            .await
            .unwrap();

        let request = VillaCreateDto {
            rate: -1.0,
            ..pool_house()
        };
        let error = create_villa(State(state), Ok(Json(request)))
            .await
            .unwrap_err();

        let details = error.error.details.unwrap();
        assert_eq!(details[0].field, "rate");
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_villa_keeps_created_at(state: AppState) {
        let (_, _, Json(created)) = create_villa(State(state.clone()), Ok(Json(pool_house())))
            .await
            .unwrap();
        let before = state
            .villa_repository
            .find_by_id(VillaId::new(created.id))
            .await
            .unwrap()
            .unwrap();

        let request = VillaDto {
            occupancy: 4,
            ..created
        };
        let status = update_villa(State(state.clone()), Path(1), Ok(Json(request)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let after = state
            .villa_repository
            .find_by_id(VillaId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.occupancy, 4);
        assert_eq!(after.created_at, before.created_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check_counts_villas(state: AppState) {
        create_villa(State(state.clone()), Ok(Json(pool_house())))
            .await
            .unwrap();

        let Json(health) = health_check(State(state)).await.unwrap();

        assert_eq!(health.status, "healthy");
        assert_eq!(health.villas, 1);
    }
}
