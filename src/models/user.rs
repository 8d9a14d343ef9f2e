use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

const MIN_PASSWORD_LEN: usize = 6;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Salted digest; never sent to clients
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a registration or user creation request
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of a partial user update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl NewUser {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if let Some(error) = check_email(&self.email) {
            errors.push(error);
        }
        if let Some(error) = check_password(&self.password) {
            errors.push(error);
        }
        errors
    }
}

impl UserPatch {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.push("Name is required".to_string());
        }
        if let Some(error) = self.email.as_deref().and_then(check_email) {
            errors.push(error);
        }
        if let Some(error) = self.password.as_deref().and_then(check_password) {
            errors.push(error);
        }
        errors
    }
}

impl User {
    /// Creates a non-admin user from an already-hashed password
    pub fn new(name: String, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Option<String> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    (!valid).then(|| "A valid email is required".to_string())
}

fn check_password(password: &str) -> Option<String> {
    (password.chars().count() < MIN_PASSWORD_LEN)
        .then(|| format!("Password must be at least {} characters", MIN_PASSWORD_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new("Ada".to_string(), "ada@example.com", "secret-hash".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_email_is_normalized() {
        let user = User::new(" Ada ".to_string(), "  Ada@Example.COM ", String::new());
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn test_new_user_validation() {
        let user = NewUser {
            name: "".to_string(),
            email: "nope".to_string(),
            password: "123".to_string(),
        };
        assert_eq!(user.validate().len(), 3);

        let user = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(user.validate().is_empty());
    }

    #[test]
    fn test_patch_validates_only_present_fields() {
        assert!(UserPatch::default().validate().is_empty());

        let patch = UserPatch {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert_eq!(patch.validate(), vec!["A valid email is required"]);
    }
}
