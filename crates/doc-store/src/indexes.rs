//! Unique index declarations.
//!
//! Uniqueness invariants live at the storage layer so that concurrent
//! writers cannot both pass a service-level existence check and insert
//! duplicates. Both backends consult the same declarations; the Postgres
//! migration mirrors them as partial expression indexes.

/// A unique constraint over one or more top-level document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueIndex {
    /// Collection the index applies to.
    pub collection: &'static str,
    /// Fields forming the unique key.
    pub fields: &'static [&'static str],
    /// Constraint name, matching the index name in the SQL migration.
    pub name: &'static str,
}

impl UniqueIndex {
    /// Renders the field list for error messages.
    pub fn field_list(&self) -> String {
        self.fields.join(", ")
    }
}

/// Unique indexes enforced across all backends.
///
/// `orders.(user_profile_id, event_id)` is the one-order-per-user-per-event
/// invariant; the rest guard registration and group naming.
pub fn unique_indexes() -> &'static [UniqueIndex] {
    &[
        UniqueIndex {
            collection: "users",
            fields: &["email"],
            name: "ux_users_email",
        },
        UniqueIndex {
            collection: "groups",
            fields: &["name"],
            name: "ux_groups_name",
        },
        UniqueIndex {
            collection: "user_profiles",
            fields: &["user_id"],
            name: "ux_user_profiles_user_id",
        },
        UniqueIndex {
            collection: "orders",
            fields: &["user_profile_id", "event_id"],
            name: "ux_orders_profile_event",
        },
    ]
}

/// Looks up a declared index by its constraint name.
pub fn index_by_name(name: &str) -> Option<&'static UniqueIndex> {
    unique_indexes().iter().find(|ix| ix.name == name)
}
