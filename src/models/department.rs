use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(rename = "_id")]
    pub department_id: Uuid,
    pub stt: i64,
    pub ten: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct DepartmentDraft {
    #[validate(range(min = 1))]
    pub stt: i64,
    #[validate(length(min = 1, max = 255))]
    pub ten: String,
}

impl DepartmentDraft {
    pub fn normalized(mut self) -> Self {
        self.ten = self.ten.trim().to_string();
        self
    }
}
