//! Accounts: the user entity, the creation factory and signup/login.

mod password;
mod service;
mod signup;

use chrono::{DateTime, Utc};
use common::UserId;
use store::{NewUserRecord, UserRecord};

use crate::error::DomainError;
use crate::policy::Caller;
use crate::validation::ValidationErrors;

pub use service::{AccountService, Login};
pub use signup::{Credentials, Signup};

/// A registered account.
///
/// The password hash is kept private; it is only ever compared through
/// [`User::check_password`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    password_hash: String,
}

impl User {
    /// The identity requests made by this user run as.
    pub fn caller(&self) -> Caller {
        Caller::User {
            id: self.id,
            is_staff: self.is_staff,
        }
    }

    pub fn check_password(&self, candidate: &str) -> bool {
        password::verify_password(candidate, &self.password_hash)
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            username: record.username,
            phone_number: record.phone_number,
            is_staff: record.is_staff,
            is_superuser: record.is_superuser,
            is_active: record.is_active,
            date_joined: record.date_joined,
            password_hash: record.password_hash,
        }
    }
}

/// Input to the account factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub password: String,
}

impl NewUser {
    /// Builds an active, unprivileged account with a hashed password.
    ///
    /// Email, username and phone number must all be non-empty; the first
    /// missing one is reported.
    pub fn create_user(self) -> Result<NewUserRecord, DomainError> {
        self.build(false)
    }

    /// Builds an active account with staff and superuser rights.
    pub fn create_superuser(self) -> Result<NewUserRecord, DomainError> {
        self.build(true)
    }

    fn build(self, privileged: bool) -> Result<NewUserRecord, DomainError> {
        for (field, value, message) in [
            ("email", &self.email, "Email must be provided"),
            ("username", &self.username, "Username must be provided"),
            (
                "phone_number",
                &self.phone_number,
                "Phone number must be provided",
            ),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationErrors::single(field, message).into());
            }
        }

        Ok(NewUserRecord {
            password_hash: password::hash_password(&self.password)?,
            email: self.email,
            username: self.username,
            phone_number: self.phone_number,
            is_staff: privileged,
            is_superuser: privileged,
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            phone_number: "+15550001111".to_string(),
            password: "s3cret-pass".to_string(),
        }
    }

    #[test]
    fn create_user_hashes_password() {
        let record = new_user().create_user().unwrap();

        assert_ne!(record.password_hash, "s3cret-pass");
        assert!(record.is_active);
        assert!(!record.is_staff);
        assert!(!record.is_superuser);
    }

    #[test]
    fn create_superuser_sets_flags() {
        let record = new_user().create_superuser().unwrap();
        assert!(record.is_staff && record.is_superuser && record.is_active);
    }

    #[test]
    fn missing_fields_are_rejected_before_hashing() {
        let err = NewUser {
            phone_number: "  ".to_string(),
            ..new_user()
        }
        .create_user()
        .unwrap_err();

        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("phone_number").unwrap(),
            ["Phone number must be provided"]
        );

        assert!(matches!(
            NewUser {
                email: String::new(),
                ..new_user()
            }
            .create_user(),
            Err(DomainError::Validation(_))
        ));
    }
}
