//! API module for HTTP handlers.
//!
//! This module contains route definitions, request/response handlers and
//! the patch document format.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod patch;
pub mod routes;

pub use dto::{MAX_NAME_LENGTH, VillaCreateDto, VillaDto};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{
    AppState, HealthResponse, create_villa, delete_villa, get_villa, health_check, list_villas,
    update_partial_villa, update_villa,
};
pub use patch::{PatchOperation, VillaField, apply_patch};
pub use routes::{VILLAS_PATH, router};
