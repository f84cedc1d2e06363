#![doc = "The `taskbin` library crate."]
#![doc = ""]
#![doc = "Core business logic for the TaskBin project/task tracker: domain models,"]
#![doc = "cookie-based access/refresh token authentication, the soft-delete trash"]
#![doc = "lifecycle (including the background purge), routing configuration and"]
#![doc = "error handling. The main binary (`main.rs`) wires these into a server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod sweep;
