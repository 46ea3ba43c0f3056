use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination chat space, e.g. `spaces/ABC123`.
///
/// The name is spliced into the outbound message URL, so only
/// `spaces/<id>` with an id of ASCII letters, digits, `_` or `-` is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSpace(String);

impl ChatSpace {
    pub fn parse(name: &str) -> Option<Self> {
        let id = name.strip_prefix("spaces/")?;
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub text: String,
    pub url: Option<String>,
}

/// Inbound chat event. Only `space.name` is read; everything else is ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TriggerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub name: String,
}

impl TriggerMessage {
    pub fn for_space(name: impl Into<String>) -> Self {
        Self {
            space: Some(Space { name: name.into() }),
        }
    }

    /// The raw space name, if the payload carries a non-empty one.
    pub fn space_name(&self) -> Option<&str> {
        self.space
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
    }
}
