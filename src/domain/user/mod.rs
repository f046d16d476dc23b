// User domain module
// Credentials and the registration rules applied before a user is stored

pub mod value_objects;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::validation::{FieldErrors, BLANK, REQUIRED};
use value_objects::{Email, Username};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// A stored user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A user ready to be inserted (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
}

/// Raw signup payload; every field optional so missing ones become field errors
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password2: Option<String>,
}

/// Signup data that passed validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub password: String,
}

impl RegistrationInput {
    /// Validates every field, collecting all failures at once
    ///
    /// Username uniqueness needs the user store and is checked by the caller.
    pub fn validate(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = match self.username {
            None => {
                errors.add("username", REQUIRED);
                None
            }
            Some(raw) => Username::new(raw.trim())
                .map_err(|e| errors.add("username", e))
                .ok(),
        };

        let email = match self.email.as_deref().map(str::trim) {
            None => {
                errors.add("email", REQUIRED);
                None
            }
            Some("") => {
                errors.add("email", BLANK);
                None
            }
            Some(raw) => Email::new(raw).map_err(|e| errors.add("email", e)).ok(),
        };

        let password = match self.password {
            None => {
                errors.add("password", REQUIRED);
                None
            }
            Some(p) if p.is_empty() => {
                errors.add("password", BLANK);
                None
            }
            Some(p) if p.chars().count() < MIN_PASSWORD_LEN => {
                errors.add(
                    "password",
                    format!(
                        "This password is too short. It must contain at least {} characters.",
                        MIN_PASSWORD_LEN
                    ),
                );
                None
            }
            Some(p) => Some(p),
        };

        if let (Some(password), Some(confirmation)) = (&password, &self.password2) {
            if password != confirmation {
                errors.add("password2", "Password fields didn't match.");
            }
        }

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => {
                Ok(Registration {
                    username,
                    email,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Raw login payload
#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login credentials that are at least present
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = present(&mut errors, "username", self.username);
        let password = present(&mut errors, "password", self.password);

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(errors),
        }
    }
}

fn present(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v),
    }
}
