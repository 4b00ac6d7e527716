use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::department::{Department, DepartmentDraft};

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Department>, StoreError>;
    async fn find_by_id(&self, department_id: Uuid) -> Result<Option<Department>, StoreError>;
    async fn create(&self, draft: &DepartmentDraft) -> Result<Department, StoreError>;
    async fn update_by_id(&self, department_id: Uuid, draft: &DepartmentDraft) -> Result<Option<Department>, StoreError>;
    async fn delete_by_id(&self, department_id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgDepartmentStore {
    pool: PgPool,
}

impl PgDepartmentStore {
    pub fn new(pool: PgPool) -> Self {
        PgDepartmentStore { pool }
    }
}

#[async_trait]
impl DepartmentStore for PgDepartmentStore {
    async fn list(&self) -> Result<Vec<Department>, StoreError> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT department_id, stt, ten, created_at, updated_at FROM departments ORDER BY stt",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    async fn find_by_id(&self, department_id: Uuid) -> Result<Option<Department>, StoreError> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT department_id, stt, ten, created_at, updated_at FROM departments WHERE department_id = $1",
        )
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }

    async fn create(&self, draft: &DepartmentDraft) -> Result<Department, StoreError> {
        let now = Utc::now();
        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (department_id, stt, ten, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) \
             RETURNING department_id, stt, ten, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(draft.stt)
        .bind(draft.ten.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(department)
    }

    async fn update_by_id(&self, department_id: Uuid, draft: &DepartmentDraft) -> Result<Option<Department>, StoreError> {
        let department = sqlx::query_as::<_, Department>(
            "UPDATE departments SET stt = $1, ten = $2, updated_at = $3 WHERE department_id = $4 \
             RETURNING department_id, stt, ten, created_at, updated_at",
        )
        .bind(draft.stt)
        .bind(draft.ten.as_str())
        .bind(Utc::now())
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }

    async fn delete_by_id(&self, department_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM departments WHERE department_id = $1")
            .bind(department_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
