use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Local identifier of a queued inspection: `<epoch millis>-<random base36>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingEntryId(String);

impl PendingEntryId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Pending entry ID cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for PendingEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PendingEntryId> for String {
    fn from(id: PendingEntryId) -> Self {
        id.0
    }
}

impl FromStr for PendingEntryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}
