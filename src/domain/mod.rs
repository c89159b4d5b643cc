//! Domain module for villa management.
//!
//! This module contains the storage shape of a villa and its value objects.

pub mod villa;

pub use villa::{NewVilla, Timestamp, Villa, VillaId};
