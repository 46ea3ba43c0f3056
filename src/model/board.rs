use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(default)]
    pub login: String,
}

/// One item in a project column, usually a pull request awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Free text. GitHub sends `null` for cards that link an issue or PR.
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub creator: Creator,
    /// API URL of the linked issue or pull request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
}
