//! Domain aggregates exposed by the studio service layer.

pub mod generation;
pub mod types;
pub mod user;
