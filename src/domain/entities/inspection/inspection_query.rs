use crate::domain::value_objects::CompletionStatus;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionFilter {
    pub status: Option<CompletionStatus>,
    /// Case-insensitive substring match on the valve code.
    pub valve_code_search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl InspectionFilter {
    pub fn with_status(mut self, status: CompletionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.valve_code_search = if search.trim().is_empty() {
            None
        } else {
            Some(search.trim().to_string())
        };
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        let limit = page_size.max(1);
        Self {
            limit,
            offset: page.saturating_mul(limit),
        }
    }
}
