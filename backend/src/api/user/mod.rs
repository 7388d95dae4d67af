//! Module for user profile API endpoints.
//!
//! This module handles reading and updating the signed-in user's profile.

pub mod handlers;
pub mod routes;
