//! Core business logic for the authentication system.
//!
//! Registration is double opt-in: nothing is stored until the activation token
//! mailed by [`AuthService::register`] comes back to [`AuthService::activate`].
//! Password resets pair a signed token with a verbatim copy kept on the user
//! row so each reset link works exactly once.

use crate::auth::models::*;
use crate::database::models::{NewUser, Role, User};
use crate::errors::{ServiceError, ServiceResult, StoreError};
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::{EmailTemplate, NotificationSink};
use crate::state::AppState;
use crate::utils::crypto::CredentialCodec;
use crate::utils::generate_random_string::generate_username;
use crate::utils::jwt::TokenService;
use crate::utils::normalize_email;

/// Authentication service for registration, login and password resets
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    notifier: &'a dyn NotificationSink,
    tokens: &'a TokenService,
    credentials: &'a CredentialCodec,
}

impl<'a> AuthService<'a> {
    pub fn new(
        users: &'a dyn UserRepository,
        notifier: &'a dyn NotificationSink,
        tokens: &'a TokenService,
        credentials: &'a CredentialCodec,
    ) -> Self {
        Self {
            users,
            notifier,
            tokens,
            credentials,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.users.as_ref(),
            state.notifier.as_ref(),
            state.tokens.as_ref(),
            &state.credentials,
        )
    }

    /// Starts a registration by mailing an activation token.
    ///
    /// # Returns
    /// The normalized address the activation email was sent to
    ///
    /// # Errors
    /// - `AlreadyExists` if an account already uses the email
    /// - `NotificationFailed` if the activation email could not be sent
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<String> {
        let email = normalize_email(&request.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::already_exists("User", email));
        }

        let intent = RegistrationIntent {
            name: request.name.trim().to_string(),
            email: email.clone(),
            password: request.password,
        };
        let token = self.tokens.issue_registration(&intent)?;

        self.notifier
            .send(&email, &EmailTemplate::AccountActivation { token })
            .await?;

        tracing::info!("Activation email sent to {}", email);
        Ok(email)
    }

    /// Persists the user carried by an activation token.
    ///
    /// # Errors
    /// - `TokenExpired` / `InvalidToken` for a bad token
    /// - `AlreadyExists` if the email was claimed since registration
    pub async fn activate(&self, request: ActivateRequest) -> ServiceResult<User> {
        let claims = self.tokens.verify_registration(&request.token)?;
        let intent = claims.intent;

        // Two registrations may race for the same email; only one activation wins.
        if self.users.find_by_email(&intent.email).await?.is_some() {
            return Err(ServiceError::already_exists("User", intent.email));
        }

        let credential = self.credentials.set_password(&intent.password);
        let new_user = NewUser {
            username: generate_username(),
            name: intent.name,
            email: intent.email,
            hashed_password: credential.hash,
            salt: credential.salt,
            role: Role::Subscriber,
        };

        let user = self.users.insert(new_user).await.map_err(|e| match e {
            StoreError::DuplicateKey(key) => ServiceError::already_exists("User", key),
            other => ServiceError::from(other),
        })?;

        tracing::info!("User {} activated", user.id);
        Ok(user)
    }

    /// Verifies credentials and issues a session token.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let email = normalize_email(&request.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &email))?;

        if !self
            .credentials
            .verify(&request.password, &user.salt, &user.hashed_password)
        {
            return Err(ServiceError::unauthorized("Email and password do not match"));
        }

        let token = self.tokens.issue_session(&user.id)?;

        Ok(LoginResponse {
            token,
            user: user.summary(),
        })
    }

    /// Issues a reset token, stores it on the user and mails it.
    ///
    /// The stored token is kept even when the email cannot be sent.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> ServiceResult<String> {
        let email = normalize_email(&request.email);

        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &email))?;

        let token = self.tokens.issue_reset(&user.name)?;
        user.reset_password_link = token.clone();
        self.users.update(&user).await?;

        self.notifier
            .send(&email, &EmailTemplate::PasswordReset { token })
            .await?;

        tracing::info!("Password reset email sent to {}", email);
        Ok(email)
    }

    /// Consumes a reset token and replaces the user's credential.
    ///
    /// # Errors
    /// - `TokenExpired` / `InvalidToken` for a bad token
    /// - `InvalidToken` when no user holds the token (already used or superseded)
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        self.tokens.verify_reset(&request.reset_password_link)?;

        let mut user = self
            .users
            .find_by_reset_token(&request.reset_password_link)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        let credential = self.credentials.set_password(&request.new_password);
        user.hashed_password = credential.hash;
        user.salt = credential.salt;
        user.reset_password_link.clear();
        self.users.update(&user).await?;

        tracing::info!("Password reset for user {}", user.id);
        Ok(())
    }
}
