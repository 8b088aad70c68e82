//! Identifier newtypes and opaque id generation.
//!
//! Curriculum ids are assigned by the curriculum store and carried through
//! unchanged. Ids minted by this crate are `{prefix}_` + base58 of 16
//! random bytes from the operating system's cryptographic source.

use rand::RngCore;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a learner account.
    LearnerId
);
string_id!(
    /// Identifier of a course in the curriculum store.
    CourseId
);
string_id!(
    /// Identifier of a module, unique across the curriculum store.
    ModuleId
);
string_id!(
    /// Identifier of a lesson within its module.
    LessonId
);
string_id!(
    /// Identifier of a question within its lesson.
    QuestionId
);

/// Fill a fixed-size array with cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// Mint a fresh opaque identifier of the form `{prefix}_{base58}`.
pub fn mint(prefix: &str) -> String {
    let bytes: [u8; 16] = random_bytes();
    format!("{prefix}_{}", bs58::encode(bytes).into_string())
}
