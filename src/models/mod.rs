//! Request and Response models for the cache host API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::{SetRequest, MAX_KEY_LENGTH};
pub use responses::{ErrorResponse, GetResponse, HasResponse, HealthResponse, MessageResponse};
