//! Business workflows invoked by the HTTP routes.

pub mod auth;
pub mod errors;
pub mod generation;

pub use errors::{ServiceError, ServiceResult};
