//! HTTP request handlers, one module per resource group.
//!
//! Each module exposes an `OpenApiRouter` with paths relative to `/api/v1`.

pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod feedback;
pub mod geography;
pub mod health;
