use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum JournalError {
    Io(std::io::Error),
    TomlDecode(toml::de::Error),
    TomlEncode(toml::ser::Error),
    Json(serde_json::Error),
    InvalidDate(String),
    InvalidSlot { slot: usize, slots: usize },
    NoKeyForProvider,
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalError::Io(err) => write!(f, "io error: {err}"),
            JournalError::TomlDecode(err) => write!(f, "failed to parse preferences: {err}"),
            JournalError::TomlEncode(err) => write!(f, "failed to encode preferences: {err}"),
            JournalError::Json(err) => write!(f, "failed to encode JSON output: {err}"),
            JournalError::InvalidDate(raw) => write!(f, "invalid date `{raw}` (expected YYYY-MM-DD)"),
            JournalError::InvalidSlot { slot, slots } => {
                write!(f, "quick emoji slot {slot} is out of range (1-{slots})")
            }
            JournalError::NoKeyForProvider => write!(f, "provider `none` does not take an API key"),
        }
    }
}

impl std::error::Error for JournalError {}

impl From<std::io::Error> for JournalError {
    fn from(err: std::io::Error) -> Self {
        JournalError::Io(err)
    }
}
