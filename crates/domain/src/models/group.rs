use chrono::{DateTime, Utc};
use common::{GroupId, UserId};
use doc_store::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group of coffee drinkers. Read-only after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Unique across all groups (storage-enforced).
    pub name: String,
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a new group owned by the given user.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            description: description.into(),
            created_by,
            created_at: Utc::now(),
        }
    }
}

impl Record for Group {
    const COLLECTION: &'static str = "groups";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
