//! Bearer token and identity for the running client.
//!
//! One `Session` is created at startup and shared by `Arc` with the HTTP client and the
//! controllers. Nothing reads it through global state.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::User;

#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
    user: RwLock<Option<User>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    pub fn token(&self) -> Option<String> {
        read(&self.token).clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *write(&self.token) = Some(token.into());
    }

    /// Value for the `Authorization` header. Empty when no token is held; the server
    /// rejects such requests.
    pub fn authorization_header(&self) -> String {
        self.token()
            .map(|t| format!("Bearer {}", t))
            .unwrap_or_default()
    }

    pub fn current_user(&self) -> Option<User> {
        read(&self.user).clone()
    }

    pub fn set_user(&self, user: User) {
        *write(&self.user) = Some(user);
    }

    pub fn is_authenticated(&self) -> bool {
        read(&self.user).is_some()
    }

    /// Forget token and identity.
    pub fn clear(&self) {
        *write(&self.token) = None;
        *write(&self.user) = None;
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
