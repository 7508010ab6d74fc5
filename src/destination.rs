//! Chat identifiers.

use std::fmt;
use std::str::FromStr;

use teloxide::types::{ChatId, Recipient};

/// Chat or channel a message is delivered to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Numeric chat id (users, groups, channels)
    Chat(i64),
    /// Public channel username, always with a leading `@`
    Channel(String),
}

impl Destination {
    /// Builds a channel destination, adding the leading `@` if missing.
    #[must_use]
    pub fn channel(name: &str) -> Self {
        let name = name.trim();
        if name.starts_with('@') {
            Self::Channel(name.to_string())
        } else {
            Self::Channel(format!("@{name}"))
        }
    }
}

impl FromStr for Destination {
    type Err = std::convert::Infallible;

    /// Integers become [`Destination::Chat`], anything else a channel username.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::channel(s), Self::Chat))
    }
}

impl From<i64> for Destination {
    fn from(id: i64) -> Self {
        Self::Chat(id)
    }
}

impl From<&Destination> for Recipient {
    fn from(dest: &Destination) -> Self {
        match dest {
            Destination::Chat(id) => Self::Id(ChatId(*id)),
            Destination::Channel(name) => Self::ChannelUsername(name.clone()),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat(id) => write!(f, "{id}"),
            Self::Channel(name) => f.write_str(name),
        }
    }
}
