use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::timeutil;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub follow_up_open: bool,
}

impl Contact {
    pub fn display_name(&self) -> &str {
        self.client_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.phone)
    }
}

/// Which side of the conversation a message belongs to. The stages feeding
/// the backend disagree on labels ("user" vs "incoming", "bot" vs
/// "outgoing"), so everything funnels through [`normalize_direction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    #[default]
    Outgoing,
}

/// Exactly "user" and "incoming" mean Incoming; any other label, known or
/// not ("USER" included — the feeds emit lowercase), falls into the Outgoing
/// catch-all. That side being the default is deliberate and decides bubble
/// alignment, so the match stays literal.
pub fn normalize_direction(raw: &str) -> Direction {
    match raw {
        "user" | "incoming" => Direction::Incoming,
        _ => Direction::Outgoing,
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize_direction(&raw))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: i64,
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub direction: Direction,
    /// Raw backend timestamp, kept verbatim; normalize at display time.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub follow_up_needed: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub handled_by: Option<String>,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

fn default_message_type() -> String {
    "text".to_string()
}

impl Message {
    pub fn local_time(&self) -> DateTime<FixedOffset> {
        timeutil::normalize(&self.timestamp)
    }
}

/// Body of the follow-up PATCH. Absent fields are left untouched by the
/// backend, so they are skipped rather than sent as null.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpUpdate {
    pub follow_up_needed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Template,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Template => "template",
        }
    }
}
