use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote record status: `concluido` once every slot holds a stored photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionStatus {
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "concluido")]
    Completed,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::InProgress => "em_andamento",
            CompletionStatus::Completed => "concluido",
        }
    }

    pub fn derive(initial: Option<&str>, during: Option<&str>, final_: Option<&str>) -> Self {
        if initial.is_some() && during.is_some() && final_.is_some() {
            CompletionStatus::Completed
        } else {
            CompletionStatus::InProgress
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "em_andamento" => Ok(CompletionStatus::InProgress),
            "concluido" => Ok(CompletionStatus::Completed),
            other => Err(format!("Unknown inspection status: {other}")),
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
