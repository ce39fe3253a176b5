//! Messages shown on station screens.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Screen channel a message is published on.
///
/// Upstream documents three channels. Anything else passes through verbatim
/// so that new channels are not lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageChannel {
    Information,
    Perturbation,
    Commercial,
    Other(String),
}

impl MessageChannel {
    pub fn as_str(&self) -> &str {
        match self {
            MessageChannel::Information => "Information",
            MessageChannel::Perturbation => "Perturbation",
            MessageChannel::Commercial => "Commercial",
            MessageChannel::Other(s) => s,
        }
    }

    /// Map a channel tag as sent by upstream.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Information" => MessageChannel::Information,
            "Perturbation" => MessageChannel::Perturbation,
            "Commercial" => MessageChannel::Commercial,
            other => MessageChannel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MessageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageChannel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Error returned when a caller names a channel that is not one of the known three.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message channel: {0}")]
pub struct InvalidChannel(pub String);

/// Strict parse for caller input; only the documented channels are accepted.
impl FromStr for MessageChannel {
    type Err = InvalidChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match MessageChannel::from_tag(s) {
            MessageChannel::Other(other) => Err(InvalidChannel(other)),
            known => Ok(known),
        }
    }
}

/// A message displayed on station screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenMessage {
    pub id: String,
    pub channel: MessageChannel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    /// Display names of the referenced lines.
    pub affected_lines: Vec<String>,
    /// `None` when upstream's timestamp could not be parsed.
    pub recorded_at: Option<DateTime<Utc>>,
}
