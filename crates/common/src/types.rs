use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a UUID-backed identifier newtype.
///
/// Each entity kind gets its own identifier type to prevent mixing up,
/// say, an order id with the event it references.
macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

entity_id! {
    /// Identifier of an account-level user.
    UserId
}

entity_id! {
    /// Identifier of a per-group user profile.
    ///
    /// Distinct from [`UserId`]: a profile is the identity a user assumes
    /// inside a group and carries the group-scoped score.
    ProfileId
}

entity_id! {
    /// Identifier of a group.
    GroupId
}

entity_id! {
    /// Identifier of a brew event.
    EventId
}

entity_id! {
    /// Identifier of a coffee order placed against an event.
    OrderId
}

entity_id! {
    /// Identifier of a brew-event session record.
    BrewEventId
}
