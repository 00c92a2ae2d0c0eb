use serde::Serialize;
use sqlx::FromRow;

/// User role, stored in the `is_admin` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[repr(i32)]
pub enum Role {
    Customer = 0,
    Admin = 1,
}

impl Default for Role {
    fn default() -> Self {
        Self::Customer
    }
}

/// Database user model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(rename = "is_admin")]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A user that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Normalise an email address the same way for registration and login.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn role_defaults_to_customer() {
        assert_eq!(Role::default(), Role::Customer);
    }
}
