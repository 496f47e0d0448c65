//! Account registration, login and token authentication.

use store::{Store, StoreError};
use uuid::Uuid;

use crate::error::DomainError;
use crate::policy::Caller;
use crate::validation::{ValidationErrors, parse_fields};

use super::{Credentials, NewUser, Signup, User};

/// A successful login.
#[derive(Debug, Clone)]
pub struct Login {
    /// Opaque bearer token for the `Authorization` header.
    pub token: String,
    pub user: User,
}

/// Service for managing accounts.
pub struct AccountService<S: Store> {
    store: S,
}

impl<S: Store> AccountService<S> {
    /// Creates a new account service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers an unprivileged account from a signup body.
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, body: &[u8]) -> Result<User, DomainError> {
        let fields = parse_fields(body)?;
        let new_user = Signup::from_fields(&fields)?;
        let record = new_user.create_user()?;

        let user: User = self
            .store
            .insert_user(record)
            .await
            .map_err(conflict_to_validation)?
            .into();

        metrics::counter!("users_registered_total").increment(1);
        tracing::info!(user_id = %user.id, "user registered");

        Ok(user)
    }

    /// Checks credentials and issues a new bearer token.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, body: &[u8]) -> Result<Login, DomainError> {
        let fields = parse_fields(body)?;
        let credentials = Credentials::from_fields(&fields)?;

        let user = self
            .store
            .get_user_by_email(&credentials.email)
            .await?
            .map(User::from)
            .filter(|user| user.is_active && user.check_password(&credentials.password));

        let Some(user) = user else {
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            tracing::warn!("login rejected");
            return Err(DomainError::InvalidCredentials);
        };

        let token = Uuid::new_v4().simple().to_string();
        self.store.insert_token(&token, user.id).await?;

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(Login { token, user })
    }

    /// Resolves a bearer token to the caller it belongs to.
    pub async fn authenticate(&self, token: &str) -> Result<Caller, DomainError> {
        match self.store.get_user_by_token(token).await? {
            Some(record) if record.is_active => Ok(User::from(record).caller()),
            _ => Err(DomainError::InvalidToken),
        }
    }

    /// Creates a superuser unless an account with that email already exists.
    ///
    /// Returns the new user, or `None` when creation was skipped.
    #[tracing::instrument(skip_all, fields(email = %new_user.email))]
    pub async fn ensure_superuser(&self, new_user: NewUser) -> Result<Option<User>, DomainError> {
        if self.store.get_user_by_email(&new_user.email).await?.is_some() {
            tracing::info!("superuser already exists, skipping");
            return Ok(None);
        }

        let record = new_user.create_superuser()?;
        let user: User = self
            .store
            .insert_user(record)
            .await
            .map_err(conflict_to_validation)?
            .into();

        tracing::info!(user_id = %user.id, "superuser created");
        Ok(Some(user))
    }
}

fn conflict_to_validation(err: StoreError) -> DomainError {
    match err {
        StoreError::Conflict { field: "email" } => {
            ValidationErrors::single("email", "Email already exists").into()
        }
        StoreError::Conflict {
            field: "phone_number",
        } => ValidationErrors::single("phone_number", "Phone number already exists").into(),
        other => other.into(),
    }
}
