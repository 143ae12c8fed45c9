//! Group service.

use common::{GroupId, UserId};
use doc_store::{DocumentStore, DocumentStoreExt, Record};
use serde::Deserialize;

use crate::models::{Group, User};
use crate::DomainError;

/// Parameters for creating a group.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Service for managing groups.
#[derive(Clone)]
pub struct GroupService<S> {
    store: S,
}

impl<S: DocumentStore> GroupService<S> {
    /// Creates a new group service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a group owned by the authenticated user.
    ///
    /// The group name is unique across the whole store; a second group
    /// with the same name is rejected at the storage layer.
    #[tracing::instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_group(&self, user_id: UserId, req: NewGroup) -> Result<Group, DomainError> {
        if req.name.trim().is_empty() {
            return Err(DomainError::Validation("group name is required".to_string()));
        }
        if !self.store.exists(User::COLLECTION, user_id.as_uuid()).await? {
            return Err(DomainError::Unauthorized(format!(
                "no user associated with id {user_id}"
            )));
        }

        let group = Group::new(req.name, req.description, user_id);
        self.store.insert_record(&group).await?;

        metrics::counter!("groups_created").increment(1);
        tracing::info!(group_id = %group.id, "group created");
        Ok(group)
    }

    /// Fetches a group by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_group(&self, id: GroupId) -> Result<Group, DomainError> {
        self.store
            .get::<Group>(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no group associated with id {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_store::InMemoryDocumentStore;

    async fn seed_user(store: &InMemoryDocumentStore) -> UserId {
        let user = User::new("iva@example.com", "hash", "Iva", "Kovac");
        store.insert_record(&user).await.unwrap();
        user.id
    }

    fn new_group(name: &str) -> NewGroup {
        NewGroup {
            name: name.to_string(),
            description: "third floor kitchen".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_group() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;
        let groups = GroupService::new(store.clone());

        let group = groups
            .create_group(user_id, new_group("roastery"))
            .await
            .unwrap();
        assert_eq!(group.created_by, user_id);

        let fetched = groups.get_group(group.id).await.unwrap();
        assert_eq!(fetched, group);

        let err = groups.get_group(GroupId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;
        let groups = GroupService::new(store.clone());

        groups
            .create_group(user_id, new_group("roastery"))
            .await
            .unwrap();
        let err = groups
            .create_group(user_id, new_group("roastery"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.collection_len(Group::COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn unknown_caller_is_unauthorized() {
        let store = InMemoryDocumentStore::new();
        let groups = GroupService::new(store.clone());

        let err = groups
            .create_group(UserId::new(), new_group("roastery"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = InMemoryDocumentStore::new();
        let user_id = seed_user(&store).await;
        let groups = GroupService::new(store.clone());

        let err = groups
            .create_group(user_id, new_group("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
