//! Profile and registration form validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validation::bounded;
use super::ValidationError;

const MAX_USERNAME_LEN: usize = 150;
const MAX_NAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

/// Letters, digits and `@ . + - _`
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// # Example
    /// ```
    /// use blogicum_server::models::Username;
    ///
    /// assert!(Username::new("leo.tolstoy").is_ok());
    /// assert!(Username::new("with space").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let name = bounded(s, "username", MAX_USERNAME_LEN)?;

        if !USERNAME_RE.is_match(&name) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may contain only letters, digits and @/./+/-/_",
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Profile fields shared by registration and the edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Validated profile fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl ProfileDraft {
    pub fn new(form: &ProfileForm) -> Result<Self, ValidationError> {
        let username = Username::new(&form.username)?;
        let first_name = optional_name(&form.first_name, "first name")?;
        let last_name = optional_name(&form.last_name, "last name")?;

        let email = form.email.trim();
        let email = if email.is_empty() {
            None
        } else {
            if email.len() > MAX_EMAIL_LEN {
                return Err(ValidationError::TooLong {
                    field: "email",
                    max: MAX_EMAIL_LEN,
                });
            }
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidFormat {
                    field: "email",
                    reason: "enter a valid email address",
                });
            }
            Some(email.to_owned())
        };

        Ok(Self {
            username,
            first_name,
            last_name,
            email,
        })
    }
}

fn optional_name(s: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(trimmed.to_owned())
}

/// Registration form: profile fields plus the password entered twice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(flatten)]
    pub profile: ProfileForm,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Validated registration
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub profile: ProfileDraft,
    pub password: String,
}

impl RegistrationDraft {
    pub fn new(form: &RegistrationForm) -> Result<Self, ValidationError> {
        let profile = ProfileDraft::new(&form.profile)?;

        if form.password1.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        if form.password1 != form.password2 {
            return Err(ValidationError::Mismatch { field: "password" });
        }
        if form.password1.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "must be at least 8 characters long",
            });
        }
        if form.password1 == profile.username.as_str() {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "too similar to the username",
            });
        }

        Ok(Self {
            profile,
            password: form.password1.clone(),
        })
    }
}
