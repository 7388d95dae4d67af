//! Persistence layer.
//!
//! Each repository is a trait consumed by the services plus its SQLite
//! implementation backed by the shared pool.

pub mod category_repository;
pub mod link_repository;
pub mod user_repository;
