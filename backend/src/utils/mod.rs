//! Collection of general utility functions.
//!
//! This module serves as a repository for small, reusable helpers that do not
//! fit into other specific domain modules: credential hashing, token signing,
//! random identifiers and slugs.

pub mod crypto;
pub mod generate_random_string;
pub mod jwt;
pub mod slug;

/// Normalizes an email address the way it is stored: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
