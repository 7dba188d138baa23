// Library exports for quillboard
// Integration tests drive the router through these modules

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod ids;
pub mod models;
pub mod query;
pub mod routes;
pub mod state;
pub mod store;
