use rand::{Rng, distributions::Alphanumeric};

/// Length of generated usernames.
pub const USERNAME_LEN: usize = 10;

/// Generates a random alphanumeric string of the specified length.
///
/// The generated string contains uppercase letters (A-Z), lowercase letters (a-z),
/// and digits (0-9).
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generates an opaque, lower-case username for a newly activated account.
pub fn generate_username() -> String {
    generate_random_string(USERNAME_LEN).to_lowercase()
}
