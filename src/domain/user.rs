use serde::{Deserialize, Serialize};

/// Prefix of the placeholder name given to authors seen for the first time.
pub const NEW_USER_PREFIX: &str = "New: ";

/// How many characters of the author id the placeholder name keeps.
pub const PLACEHOLDER_ID_CHARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub author_id: String,
    pub friendly_name: String,
}

impl User {
    /// `"New: "` followed by the first six characters of the author id.
    pub fn placeholder_name(author_id: &str) -> String {
        let prefix: String = author_id.chars().take(PLACEHOLDER_ID_CHARS).collect();
        format!("{}{}", NEW_USER_PREFIX, prefix)
    }
}
