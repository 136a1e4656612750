pub mod db;
pub mod domain;
pub mod dto;
pub mod models;
pub mod repository;
pub mod schema;

#[cfg(feature = "server")]
pub mod app;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod simulator;
#[cfg(feature = "server")]
pub mod uploads;

#[cfg(feature = "server")]
pub use app::run;
