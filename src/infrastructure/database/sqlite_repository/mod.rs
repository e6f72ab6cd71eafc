use super::ConnectionPool;
use crate::application::ports::InspectionRepository;
use crate::domain::entities::{
    InspectionFilter, InspectionRecord, InspectionRecordUpdate, NewInspectionRecord, PageRequest,
    SortOrder,
};
use crate::domain::value_objects::InspectionId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

mod mapper;
mod queries;

use mapper::map_inspection_row;
use queries::{
    COUNT_INSPECTIONS_BASE, DELETE_INSPECTION, INSERT_INSPECTION, SELECT_INSPECTION_BY_ID,
    SELECT_INSPECTIONS_BASE,
};

/// Inspection table backed by SQLite; stands in for the hosted remote store.
pub struct SqliteInspectionRepository {
    pool: ConnectionPool,
}

impl SqliteInspectionRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await;
        Ok(result.is_ok())
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &InspectionFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(search) = &filter.valve_code_search {
        builder
            .push(" AND instr(lower(coalesce(valve_code, '')), lower(")
            .push_bind(search.clone())
            .push(")) > 0");
    }
    if let Some(from) = filter.from {
        builder
            .push(" AND inspection_date >= ")
            .push_bind(from.timestamp_millis());
    }
    if let Some(to) = filter.to {
        builder
            .push(" AND inspection_date <= ")
            .push_bind(to.timestamp_millis());
    }
}

#[async_trait]
impl InspectionRepository for SqliteInspectionRepository {
    async fn insert(&self, record: NewInspectionRecord) -> Result<InspectionRecord, AppError> {
        let id = InspectionId::generate();
        let now = Utc::now();

        sqlx::query(INSERT_INSPECTION)
            .bind(id.as_str())
            .bind(record.valve_code.as_str())
            .bind(now.timestamp_millis())
            .bind(record.photos.initial.as_deref())
            .bind(record.photos.during.as_deref())
            .bind(record.photos.final_.as_deref())
            .bind(record.notes.as_deref())
            .bind(record.status.as_str())
            .bind(now.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Database(format!("Inserted inspection {id} not readable")))
    }

    async fn update(
        &self,
        id: &InspectionId,
        update: InspectionRecordUpdate,
    ) -> Result<InspectionRecord, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE inspections SET updated_at = ");
        builder.push_bind(Utc::now().timestamp_millis());
        if let Some(code) = update.valve_code {
            builder
                .push(", valve_code = ")
                .push_bind(code.as_str().to_string());
        }
        if let Some(photos) = update.photos {
            builder
                .push(", photo_initial_url = ")
                .push_bind(photos.initial)
                .push(", photo_during_url = ")
                .push_bind(photos.during)
                .push(", photo_final_url = ")
                .push_bind(photos.final_);
        }
        if let Some(notes) = update.notes {
            builder.push(", notes = ").push_bind(notes);
        }
        if let Some(status) = update.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id.as_str().to_string());

        let result = builder.build().execute(self.pool.get_pool()).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Inspection {id} not found")));
        }

        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inspection {id} not found")))
    }

    async fn delete(&self, id: &InspectionId) -> Result<(), AppError> {
        sqlx::query(DELETE_INSPECTION)
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn get(&self, id: &InspectionId) -> Result<Option<InspectionRecord>, AppError> {
        let row = sqlx::query(SELECT_INSPECTION_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.as_ref().map(map_inspection_row).transpose()
    }

    async fn list(
        &self,
        filter: &InspectionFilter,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Vec<InspectionRecord>, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_INSPECTIONS_BASE);
        push_filter(&mut builder, filter);
        builder.push(match order {
            SortOrder::Ascending => " ORDER BY inspection_date ASC, rowid ASC",
            SortOrder::Descending => " ORDER BY inspection_date DESC, rowid DESC",
        });
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(page.offset));

        let rows = builder.build().fetch_all(self.pool.get_pool()).await?;
        rows.iter().map(map_inspection_row).collect()
    }

    async fn count(&self, filter: &InspectionFilter) -> Result<u64, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(COUNT_INSPECTIONS_BASE);
        push_filter(&mut builder, filter);

        let row = builder.build().fetch_one(self.pool.get_pool()).await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }
}
