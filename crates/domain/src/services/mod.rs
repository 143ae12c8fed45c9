//! Domain services.

pub mod brew_events;
pub mod events;
pub mod groups;
pub mod orders;
pub mod users;

use common::UserId;
use doc_store::{DocumentStore, DocumentStoreExt, Filter};

use crate::models::UserProfile;
use crate::DomainError;

/// Resolves the caller's profile from their authenticated user id.
///
/// Ownership is always derived from the authenticated identity, never from
/// a request field.
pub(crate) async fn profile_for_user<S: DocumentStore>(
    store: &S,
    user_id: UserId,
) -> Result<UserProfile, DomainError> {
    store
        .find_one::<UserProfile>(Filter::eq("user_id", user_id.to_string()))
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("no user profile for user {user_id}")))
}
