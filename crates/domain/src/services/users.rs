//! User and profile service.

use common::{GroupId, UserId};
use doc_store::{DocumentStore, DocumentStoreExt, Filter, Record};
use serde::Deserialize;

use crate::models::{Group, User, UserProfile};
use crate::services::profile_for_user;
use crate::DomainError;

/// Parameters for registering a user. The password is hashed here, so
/// the stored record never carries cleartext. No Debug impl; the
/// cleartext must not end up in logs.
#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Parameters for creating a group-scoped profile.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub group_id: GroupId,
    pub first_name: String,
    pub last_name: String,
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Service for managing users and their profiles.
#[derive(Clone)]
pub struct UserService<S> {
    store: S,
}

impl<S: DocumentStore> UserService<S> {
    /// Creates a new user service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new user. Emails are unique (storage-enforced).
    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: Registration) -> Result<User, DomainError> {
        if !req.email.contains('@') {
            return Err(DomainError::Validation(format!(
                "invalid email address: {}",
                req.email
            )));
        }
        if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "first and last name are required".to_string(),
            ));
        }
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = auth::hash_password(&req.password);
        let user = User::new(req.email, password_hash, req.first_name, req.last_name);
        self.store.insert_record(&user).await?;

        metrics::counter!("users_registered").increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Looks a user up by email. Used by the login flow.
    #[tracing::instrument(skip(self, email))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .store
            .find_one::<User>(Filter::eq("email", email))
            .await?)
    }

    /// Checks an email/password pair and returns the matching user.
    ///
    /// A missing user and a wrong password are indistinguishable to the
    /// caller.
    #[tracing::instrument(skip(self, email, password))]
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("invalid credentials".to_string()))?;
        if !auth::verify_password(password, &user.password_hash) {
            return Err(DomainError::Unauthorized("invalid credentials".to_string()));
        }
        Ok(user)
    }

    /// Fetches a user by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<User, DomainError> {
        self.store
            .get::<User>(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no user associated with id {id}")))
    }

    /// Lists all users.
    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.store.find_records(Filter::All).await?)
    }

    /// Creates the caller's profile inside a group.
    ///
    /// A user has at most one profile; a second attempt is rejected at
    /// the storage layer regardless of the target group.
    #[tracing::instrument(skip(self, req))]
    pub async fn create_profile(
        &self,
        user_id: UserId,
        req: NewProfile,
    ) -> Result<UserProfile, DomainError> {
        self.get_user(user_id).await?;
        if !self
            .store
            .exists(Group::COLLECTION, req.group_id.as_uuid())
            .await?
        {
            return Err(DomainError::NotFound(format!(
                "no group associated with id {}",
                req.group_id
            )));
        }

        let profile = UserProfile::new(user_id, req.group_id, req.first_name, req.last_name);
        self.store.insert_record(&profile).await?;

        tracing::info!(profile_id = %profile.id, "user profile created");
        Ok(profile)
    }

    /// Resolves the caller's profile.
    #[tracing::instrument(skip(self))]
    pub async fn get_profile(&self, user_id: UserId) -> Result<UserProfile, DomainError> {
        profile_for_user(&self.store, user_id).await
    }
}
