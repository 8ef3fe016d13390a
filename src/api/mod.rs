//! HTTP layer: handlers, middleware, DTOs and the router.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
mod doc;
