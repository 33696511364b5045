//! Opaque identifiers for pipeline entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

uuid_id!(
    /// Identifier of one story segment.
    SegmentId
);
uuid_id!(
    /// Identifier of a story.
    StoryId
);
uuid_id!(
    /// Identifier of an authenticated user, supplied by the session collaborator.
    UserId
);
uuid_id!(
    /// Identifier of a pending credit reservation.
    ReservationId
);
uuid_id!(
    /// Identifier of one generation request, usable as an idempotency token.
    RequestId
);
