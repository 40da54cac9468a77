//! Form payloads and their field validation.
//!
//! Every form deserializes leniently (missing fields become empty strings)
//! so that validation, not extraction, decides what the user sees.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use url::{Host, Url};

use warbler_db::models::UserUpdate;
use warbler_types::models::{
    DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, MAX_BIO_LEN, MAX_MESSAGE_LEN, User,
};

const MIN_PASSWORD_LEN: usize = 6;

fn trimmed<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let s = String::deserialize(de)?;
    Ok(s.trim().to_string())
}

/// Error messages per field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.is_empty() {
            self.add(field, "This field is required.");
            return false;
        }
        true
    }

    fn min_chars(&mut self, field: &'static str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("Field must be at least {min} characters long."));
        }
    }

    fn max_chars(&mut self, field: &'static str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.add(field, message);
        }
    }

    fn email(&mut self, field: &'static str, value: &str) {
        if !is_email(value) {
            self.add(field, "Invalid email address.");
        }
    }

    fn optional_url(&mut self, field: &'static str, value: &str) {
        if !value.is_empty() && !is_url(value) {
            self.add(field, "Invalid URL.");
        }
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

/// Absolute http(s) URL whose host is an IP address, `localhost`, or a
/// dotted domain of well-formed labels.
fn is_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => {
            domain == "localhost"
                || (domain.contains('.') && domain.split('.').all(is_domain_label))
        }
        None => false,
    }
}

fn is_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// -- Signup --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    pub password: String,
    #[serde(deserialize_with = "trimmed")]
    pub image_url: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.required("username", &self.username);
        if errors.required("email", &self.email) {
            errors.email("email", &self.email);
        }
        if errors.required("password", &self.password) {
            errors.min_chars("password", &self.password, MIN_PASSWORD_LEN);
        }
        errors.optional_url("image_url", &self.image_url);
        errors.into_result()
    }

    pub fn image_url_or_default(&self) -> &str {
        if self.image_url.is_empty() {
            DEFAULT_IMAGE_URL
        } else {
            &self.image_url
        }
    }
}

// -- Login --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.required("username", &self.username);
        if errors.required("password", &self.password) {
            errors.min_chars("password", &self.password, MIN_PASSWORD_LEN);
        }
        errors.into_result()
    }
}

// -- Profile edit --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserEditForm {
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    pub image_url: String,
    #[serde(deserialize_with = "trimmed")]
    pub header_image_url: String,
    #[serde(deserialize_with = "trimmed")]
    pub location: String,
    pub bio: String,
    /// Confirms identity only. Never written back.
    pub password: String,
}

impl UserEditForm {
    /// Pre-filled form for `user`, with default images shown as blank.
    pub fn from_user(user: &User) -> Self {
        let blank_default = |value: &str, default: &str| {
            if value == default { String::new() } else { value.to_string() }
        };
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: blank_default(&user.image_url, DEFAULT_IMAGE_URL),
            header_image_url: blank_default(&user.header_image_url, DEFAULT_HEADER_IMAGE_URL),
            location: user.location.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            password: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.required("username", &self.username);
        if errors.required("email", &self.email) {
            errors.email("email", &self.email);
        }
        errors.optional_url("image_url", &self.image_url);
        errors.optional_url("header_image_url", &self.header_image_url);
        errors.max_chars(
            "bio",
            &self.bio,
            MAX_BIO_LEN,
            "Sorry, your bio must be under 1000 characters.",
        );
        if errors.required("password", &self.password) {
            errors.min_chars("password", &self.password, MIN_PASSWORD_LEN);
        }
        errors.into_result()
    }

    /// Profile changes to store; blank images fall back to the defaults.
    pub fn to_update(&self) -> UserUpdate {
        let or_default = |value: &str, default: &str| {
            if value.is_empty() { default.to_string() } else { value.to_string() }
        };
        let non_empty = |value: &str| (!value.trim().is_empty()).then(|| value.to_string());
        UserUpdate {
            username: self.username.clone(),
            email: self.email.clone(),
            image_url: or_default(&self.image_url, DEFAULT_IMAGE_URL),
            header_image_url: or_default(&self.header_image_url, DEFAULT_HEADER_IMAGE_URL),
            bio: non_empty(&self.bio),
            location: non_empty(&self.location),
        }
    }
}

// -- Messages --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    #[serde(deserialize_with = "trimmed")]
    pub text: String,
}

impl MessageForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if errors.required("text", &self.text) {
            errors.max_chars(
                "text",
                &self.text,
                MAX_MESSAGE_LEN,
                "Messages must be 140 characters or fewer.",
            );
        }
        errors.into_result()
    }
}
