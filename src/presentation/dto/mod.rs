pub mod inspection_dto;

use crate::shared::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.user_message()),
            error_code: Some(error.code().to_string()),
        }
    }

    pub fn from_result(result: crate::shared::Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::from_app_error(err),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaginationRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            limit: Some(50),
            offset: Some(0),
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
