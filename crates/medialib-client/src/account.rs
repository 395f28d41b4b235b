//! Authenticated identity.
//!
//! [`SessionProvider`] owns the login lifecycle on top of the shared [`Session`] that the
//! API client reads its bearer token from. After a profile change the identity is re-fetched
//! and replaced in place.

use medialib_core::models::{Credentials, ProfileUpdate, Registration, UploadFile, User};
use medialib_core::{AccountRepository, ClientError, ClientResult, Session};
use std::sync::Arc;
use validator::Validate;

use crate::notifier::Notifier;

pub struct SessionProvider {
    accounts: Arc<dyn AccountRepository>,
    session: Arc<Session>,
    notifier: Notifier,
}

impl SessionProvider {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        session: Arc<Session>,
        notifier: Notifier,
    ) -> Self {
        Self {
            accounts,
            session,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Resolve the identity for a token restored from configuration. An invalid token is
    /// dropped and `Ok(None)` returned.
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        if self.session.token().is_none() {
            return Ok(None);
        }
        match self.accounts.current_user().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "session restored");
                self.session.set_user(user.clone());
                Ok(Some(user))
            }
            Err(ClientError::Api { status: 401, .. }) => {
                tracing::info!("stored token rejected, signing out");
                self.session.clear();
                Ok(None)
            }
            Err(err) => {
                err.log("restore_session");
                Err(err)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let token = match self.accounts.login(credentials).await {
            Ok(token) => token,
            Err(err) => {
                err.log("login");
                self.notifier
                    .error(format!("Login failed: {}", err.client_message()));
                return Err(err);
            }
        };
        self.session.set_token(token.access_token);

        match self.accounts.current_user().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "logged in");
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(err) => {
                err.log("login");
                self.session.clear();
                self.notifier
                    .error(format!("Login failed: {}", err.client_message()));
                Err(err)
            }
        }
    }

    /// Tell the server, then forget the token. Server-side failures do not keep the
    /// client signed in.
    pub async fn logout(&self) {
        if self.session.token().is_some() {
            if let Err(err) = self.accounts.logout().await {
                tracing::debug!(error = %err, "server logout failed");
            }
        }
        self.session.clear();
        tracing::info!("logged out");
    }

    /// Create an account and sign in with it. The form is validated before any request.
    pub async fn register(&self, registration: Registration) -> ClientResult<User> {
        let password = registration.password.clone();
        let request = registration.into_request()?;

        if let Err(err) = self.accounts.register(&request).await {
            err.log("register");
            self.notifier
                .error(format!("Registration failed: {}", err.client_message()));
            return Err(err);
        }
        tracing::info!(username = %request.username, "account registered");

        self.login(&Credentials {
            username: request.email.clone(),
            password,
        })
        .await
    }

    /// Re-fetch the signed-in identity and replace the stored one.
    pub async fn refresh_identity(&self) -> ClientResult<User> {
        let user = self.accounts.current_user().await.map_err(|err| {
            err.log("refresh_identity");
            err
        })?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Apply a profile change. Returns the refreshed identity, or the current one when
    /// there was nothing to send.
    pub async fn update_profile(&self, update: ProfileUpdate) -> ClientResult<User> {
        let user = self
            .current_user()
            .ok_or_else(|| ClientError::Validation("Not signed in".to_string()))?;
        let update = update.cleaned();
        if update.is_empty() {
            return Ok(user);
        }
        update.validate()?;

        if let Err(err) = self.accounts.update_user(user.id, &update).await {
            err.log("update_profile");
            self.notifier
                .error(format!("Failed to update profile: {}", err.client_message()));
            return Err(err);
        }
        self.notifier.success("Profile updated successfully");
        self.refresh_identity().await
    }

    pub async fn upload_profile_picture(&self, file: &UploadFile) -> ClientResult<User> {
        if !file.content_type.starts_with("image/") {
            return Err(ClientError::Validation(
                "Profile picture must be an image".to_string(),
            ));
        }
        if let Err(err) = self.accounts.upload_profile_picture(file).await {
            err.log("upload_profile_picture");
            self.notifier.error(format!(
                "Failed to upload profile picture: {}",
                err.client_message()
            ));
            return Err(err);
        }
        self.notifier.success("Profile picture updated");
        self.refresh_identity().await
    }
}
