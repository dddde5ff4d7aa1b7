//! Newtype domain identifiers.
//!
//! Every identifier the relay handles is a distinct newtype wrapping a
//! non-empty `String`. This prevents accidentally passing — for example — an
//! [`ExecutionId`] where a [`CommitSha`] is expected, and moves the
//! "must not be empty" checks to a single place.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Name of a CodePipeline pipeline (e.g. `"demo"`).
    ///
    /// Also used verbatim as the GitHub status context, so each pipeline shows
    /// up as its own check line on the commit.
    PipelineName
}

string_id! {
    /// Identifies one run of a pipeline, as assigned by CodePipeline.
    ExecutionId
}

string_id! {
    /// A Git commit SHA as reported in the execution's artifact revision.
    CommitSha
}

string_id! {
    /// Identifies a GitHub repository in `"owner/repo"` format.
    RepositoryId
}
