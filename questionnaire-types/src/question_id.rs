use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a question, as assigned by the server.
///
/// Used as the key of `Answers` and `ValidationErrors`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

impl QuestionId {
    /// Create an identifier from the raw server value.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw server value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for QuestionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i32> for QuestionId {
    fn from(id: i32) -> Self {
        Self(i64::from(id))
    }
}
