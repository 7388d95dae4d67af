//! Linkhub backend library.
//!
//! Exposes the modules that make up the HTTP service so the binary and the
//! integration tests build the same router.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;
