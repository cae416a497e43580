use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// TOML serialization error.
    Serialize(String),
    /// A value is outside its allowed range.
    Invalid { key: &'static str, reason: String },
    /// IO error (file read, write, directory creation).
    Io(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "settings parse error: {msg}"),
            Self::Serialize(msg) => write!(f, "settings serialize error: {msg}"),
            Self::Invalid { key, reason } => write!(f, "invalid setting '{key}': {reason}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
