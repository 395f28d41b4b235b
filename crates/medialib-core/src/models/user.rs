use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::timestamp;
use crate::error::{ClientError, ClientResult};
use crate::validation::non_blank;

pub type UserId = i64;

/// Authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_content_type: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Login form (`POST /auth/token`, sent as multipart form fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Registration form, including the confirmation field that never leaves the client.
#[derive(Debug, Clone, Default, Validate)]
pub struct Registration {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub confirm_password: String,
    pub description: String,
}

impl Registration {
    /// Validate the form and produce the request body. Runs before any network call.
    pub fn into_request(self) -> ClientResult<CreateUserRequest> {
        if self.password != self.confirm_password {
            return Err(ClientError::Validation(
                "Passwords do not match".to_string(),
            ));
        }
        self.validate()?;
        Ok(CreateUserRequest {
            description: non_blank(&self.description),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            password: self.password,
        })
    }
}

/// Body of `PATCH /users/{id}`. Only the fields that changed are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProfileUpdate {
    /// Diff edited profile values against the current user. A blank password means
    /// "unchanged".
    pub fn from_changes(user: &User, full_name: &str, description: &str, password: &str) -> Self {
        let mut update = ProfileUpdate::default();
        if full_name != user.full_name {
            update.full_name = Some(full_name.to_string());
        }
        if description != user.description.as_deref().unwrap_or("") {
            update.description = Some(description.to_string());
        }
        if !password.trim().is_empty() {
            update.password = Some(password.to_string());
        }
        update
    }

    /// Drop empty-string fields so the server does not reject them.
    pub fn cleaned(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            username: keep(self.username),
            email: keep(self.email),
            password: keep(self.password),
            full_name: keep(self.full_name),
            description: keep(self.description),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "username": "ana",
            "email": "ana@example.com",
            "full_name": "Ana Souza",
            "description": null,
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-01-01T00:00:00"
        }))
        .unwrap()
    }

    fn registration() -> Registration {
        Registration {
            full_name: "Ana Souza".to_string(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "s3cret".to_string(),
            confirm_password: "s3cret".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn registration_requires_matching_passwords() {
        let mut form = registration();
        form.confirm_password = "other".to_string();
        let err = form.into_request().unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref m) if m == "Passwords do not match"));
    }

    #[test]
    fn registration_validates_email() {
        let mut form = registration();
        form.email = "not-an-email".to_string();
        assert!(matches!(
            form.into_request(),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn registration_builds_request_without_confirmation() {
        let request = registration().into_request().unwrap();
        assert_eq!(request.username, "ana");
        assert_eq!(request.description, None);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("confirm_password").is_none());
        assert!(body.get("description").is_none());
    }

    #[test]
    fn profile_update_only_carries_changes() {
        let user = user();
        let update = ProfileUpdate::from_changes(&user, "Ana Souza", "Photographer", "  ");
        assert_eq!(update.full_name, None);
        assert_eq!(update.description.as_deref(), Some("Photographer"));
        assert_eq!(update.password, None);

        let unchanged = ProfileUpdate::from_changes(&user, "Ana Souza", "", "");
        assert!(unchanged.is_empty());
    }

    #[test]
    fn cleaned_drops_empty_strings() {
        let update = ProfileUpdate {
            full_name: Some(String::new()),
            description: Some("hi".to_string()),
            ..Default::default()
        }
        .cleaned();
        assert_eq!(update.full_name, None);
        assert_eq!(update.description.as_deref(), Some("hi"));
    }
}
