use crate::domain::entities::{
    InspectionFilter, InspectionRecord, InspectionRecordUpdate, NewInspectionRecord, PageRequest,
    SortOrder,
};
use crate::domain::value_objects::InspectionId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Remote table of durably recorded inspections.
#[async_trait]
pub trait InspectionRepository: Send + Sync {
    async fn insert(&self, record: NewInspectionRecord) -> Result<InspectionRecord, AppError>;
    async fn update(
        &self,
        id: &InspectionId,
        update: InspectionRecordUpdate,
    ) -> Result<InspectionRecord, AppError>;
    async fn delete(&self, id: &InspectionId) -> Result<(), AppError>;
    async fn get(&self, id: &InspectionId) -> Result<Option<InspectionRecord>, AppError>;
    async fn list(
        &self,
        filter: &InspectionFilter,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<InspectionRecord>, AppError>;
    async fn count(&self, filter: &InspectionFilter) -> Result<u64, AppError>;
}
