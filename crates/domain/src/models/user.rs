use chrono::{DateTime, Utc};
use common::{GroupId, ProfileId, UserId};
use doc_store::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account-level user. Never hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique across all users (storage-enforced).
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Lifetime count of coffees brewed for others.
    pub coffee_count: u32,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with zeroed counters.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            coffee_count: 0,
            score: 0,
            created_at: Utc::now(),
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

/// The identity a user assumes inside a group.
///
/// Orders reference profiles, not users; the profile carries the
/// group-scoped score. One profile per user (storage-enforced).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub group_id: GroupId,
    pub first_name: String,
    pub last_name: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a profile for a user joining a group.
    pub fn new(
        user_id: UserId,
        group_id: GroupId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: ProfileId::new(),
            user_id,
            group_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            score: 0,
            created_at: Utc::now(),
        }
    }
}

impl Record for UserProfile {
    const COLLECTION: &'static str = "user_profiles";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
