use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    Initial,
    During,
    Final,
}

impl PhotoSlot {
    pub const ALL: [PhotoSlot; 3] = [PhotoSlot::Initial, PhotoSlot::During, PhotoSlot::Final];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSlot::Initial => "initial",
            PhotoSlot::During => "during",
            PhotoSlot::Final => "final",
        }
    }
}

impl fmt::Display for PhotoSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
