//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations
//! and orchestrate interactions between the repositories and the notification
//! sink, such as publishing links or updating profiles.

pub mod category_service;
pub mod email_service;
pub mod link_service;
pub mod user_service;
