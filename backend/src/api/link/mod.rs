//! Module for link API endpoints.
//!
//! This module handles link submission, listing, click counting and the
//! owner and admin edit paths.

pub mod handlers;
pub mod routes;
