use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_NAME_LEN: usize = 63;

/// Validated channel identifier: an optional leading `@`, then 1..=63
/// alphanumerics or hyphens. Anything else is rejected before it can reach
/// the registry.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ChannelName(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelNameError {
    #[error("channel name is empty")]
    Empty,
    #[error("channel name is {0} characters long, maximum is {MAX_NAME_LEN}")]
    TooLong(usize),
    #[error("channel name contains invalid character {0:?}")]
    InvalidChar(char),
}

impl ChannelName {
    pub fn parse(raw: &str) -> Result<Self, ChannelNameError> {
        let name = raw.strip_prefix('@').unwrap_or(raw);

        if name.is_empty() {
            return Err(ChannelNameError::Empty);
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ChannelNameError::TooLong(name.len()));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(ChannelNameError::InvalidChar(bad));
        }

        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelName {
    type Err = ChannelNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = ChannelNameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
