use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a bot token must be provided")]
    MissingToken,

    /// Aggregated launch-time validation failures, one message per
    /// missing field, joined by a space.
    #[error("{0}")]
    InvalidConfig(String),
}

impl Error {
    #[must_use]
    pub fn invalid_config(messages: &[String]) -> Self {
        Self::InvalidConfig(messages.join(" "))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
