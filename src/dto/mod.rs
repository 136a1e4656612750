//! DTO modules shaping the JSON returned by the API.

pub mod auth;
pub mod generation;
