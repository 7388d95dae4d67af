//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, the three token signing secrets and the
//! optional SMTP settings used for transactional email.

use anyhow::{Context, Result, bail};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// Signs session tokens.
    pub jwt_secret: String,
    /// Signs registration (account activation) tokens.
    pub jwt_account_activation: String,
    /// Signs password reset tokens.
    pub jwt_reset_password: String,
    pub server_port: u16,
    /// Frontend origin, used for CORS and for links embedded in emails.
    pub client_url: String,
    pub bcrypt_cost: u32,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: Option<String>,
    pub email_from_name: String,
    pub email_reply_to: Option<String>,
}

/// SMTP settings, present only when every required variable is set.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: Option<String>,
    pub base_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
        let jwt_account_activation =
            env::var("JWT_ACCOUNT_ACTIVATION").context("JWT_ACCOUNT_ACTIVATION not set")?;
        let jwt_reset_password =
            env::var("JWT_RESET_PASSWORD").context("JWT_RESET_PASSWORD not set")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let client_url = env::var("CLIENT_URL").context("CLIENT_URL not set")?;

        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .context("BCRYPT_COST must be a valid number")?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        let config = Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_account_activation,
            jwt_reset_password,
            server_port,
            client_url,
            bcrypt_cost,
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            email_from: env::var("EMAIL_FROM").ok(),
            email_from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Linkhub".to_string()),
            email_reply_to: env::var("EMAIL_REPLY_TO").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would silently weaken token isolation or hashing.
    pub fn validate(&self) -> Result<()> {
        let secrets = [
            ("JWT_SECRET", &self.jwt_secret),
            ("JWT_ACCOUNT_ACTIVATION", &self.jwt_account_activation),
            ("JWT_RESET_PASSWORD", &self.jwt_reset_password),
        ];

        for (name, secret) in &secrets {
            if secret.trim().is_empty() {
                bail!("{name} must not be empty");
            }
        }

        for (i, (left_name, left)) in secrets.iter().enumerate() {
            for (right_name, right) in &secrets[i + 1..] {
                if left == right {
                    bail!("{left_name} and {right_name} must be different secrets");
                }
            }
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }

        Ok(())
    }

    /// Returns the SMTP configuration when email delivery is fully configured.
    pub fn email_config(&self) -> Option<EmailConfig> {
        Some(EmailConfig {
            smtp_host: self.smtp_host.clone()?,
            smtp_port: self.smtp_port,
            smtp_username: self.smtp_username.clone()?,
            smtp_password: self.smtp_password.clone()?,
            from_email: self.email_from.clone()?,
            from_name: self.email_from_name.clone(),
            reply_to: self.email_reply_to.clone(),
            base_url: self.client_url.clone(),
        })
    }
}
