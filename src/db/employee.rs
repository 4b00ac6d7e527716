use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::employee::{CanCuoc, Employee, EmployeeDraft, Gender, TrinhDoChuyenMon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(Uuid),
    Updated(Uuid),
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Employee>, StoreError>;
    async fn list_by_department(&self, department_id: Uuid) -> Result<Vec<Employee>, StoreError>;
    async fn find_by_id(&self, employee_id: Uuid) -> Result<Option<Employee>, StoreError>;
    async fn find_one_by_stt(&self, stt: i64) -> Result<Option<Employee>, StoreError>;
    async fn create(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError>;
    /// Replaces every field of the record; identity and `created_at` stay.
    async fn update_by_id(&self, employee_id: Uuid, draft: &EmployeeDraft) -> Result<Option<Employee>, StoreError>;
    async fn delete_by_id(&self, employee_id: Uuid) -> Result<bool, StoreError>;
    async fn count_by_department(&self, department_id: Uuid) -> Result<i64, StoreError>;

    /// Creates the record unless one with the same `stt` exists, in which
    /// case that record is overwritten in place.
    async fn upsert_by_stt(&self, draft: &EmployeeDraft) -> Result<UpsertOutcome, StoreError> {
        match self.find_one_by_stt(draft.stt).await? {
            Some(existing) => {
                self.update_by_id(existing.employee_id, draft)
                    .await?
                    .ok_or_else(|| StoreError::Rejected("Employee not found".to_string()))?;
                Ok(UpsertOutcome::Updated(existing.employee_id))
            }
            None => {
                let created = self.create(draft).await?;
                Ok(UpsertOutcome::Created(created.employee_id))
            }
        }
    }
}

const DRAFT_COLUMNS: [&str; 23] = [
    "stt",
    "ho_ten",
    "chuc_danh",
    "gioi_tinh",
    "ngay_sinh",
    "sdt",
    "can_cuoc_so_the",
    "can_cuoc_ngay_cap",
    "can_cuoc_noi_cap",
    "loai_bang",
    "nam_tot_nghiep",
    "chuyen_nganh",
    "truong_dai_hoc",
    "ma_so_bhxh",
    "ma_so_thue",
    "que_quan",
    "dia_chi_hien_tai",
    "thoi_gian_bat_dau_lam_viec",
    "phan_to",
    "dia_chi_ip",
    "email",
    "ghi_chu",
    "department_id",
];

static SELECT_COLUMNS: Lazy<String> =
    Lazy::new(|| format!("employee_id, {}, created_at, updated_at", DRAFT_COLUMNS.join(", ")));

// $1 = employee_id, $2..$24 = draft, $25 = created_at, $26 = updated_at
static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    let placeholders: Vec<String> = (1..=DRAFT_COLUMNS.len() + 3).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO employees (employee_id, {}, created_at, updated_at) VALUES ({})",
        DRAFT_COLUMNS.join(", "),
        placeholders.join(", ")
    )
});

// $1 = employee_id, $2..$24 = draft, $25 = updated_at
static UPDATE_SQL: Lazy<String> = Lazy::new(|| {
    let assignments: Vec<String> = DRAFT_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 2))
        .collect();
    format!(
        "UPDATE employees SET {}, updated_at = ${} WHERE employee_id = $1 RETURNING {}",
        assignments.join(", "),
        DRAFT_COLUMNS.len() + 2,
        *SELECT_COLUMNS
    )
});

static UPSERT_SQL: Lazy<String> = Lazy::new(|| {
    let assignments: Vec<String> = DRAFT_COLUMNS
        .iter()
        .filter(|column| **column != "stt")
        .map(|column| format!("{0} = EXCLUDED.{0}", column))
        .collect();
    format!(
        "{} ON CONFLICT (stt) DO UPDATE SET {}, updated_at = EXCLUDED.updated_at \
         RETURNING employee_id, (xmax = 0) AS inserted",
        *INSERT_SQL,
        assignments.join(", ")
    )
});

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    employee_id: Uuid,
    stt: i64,
    ho_ten: String,
    chuc_danh: String,
    gioi_tinh: String,
    ngay_sinh: Option<DateTime<Utc>>,
    sdt: String,
    can_cuoc_so_the: String,
    can_cuoc_ngay_cap: Option<DateTime<Utc>>,
    can_cuoc_noi_cap: String,
    loai_bang: String,
    nam_tot_nghiep: Option<String>,
    chuyen_nganh: String,
    truong_dai_hoc: String,
    ma_so_bhxh: String,
    ma_so_thue: String,
    que_quan: String,
    dia_chi_hien_tai: String,
    thoi_gian_bat_dau_lam_viec: Option<DateTime<Utc>>,
    phan_to: String,
    dia_chi_ip: String,
    email: String,
    ghi_chu: String,
    department_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            employee_id: row.employee_id,
            profile: EmployeeDraft {
                stt: row.stt,
                ho_ten: row.ho_ten,
                chuc_danh: row.chuc_danh,
                gioi_tinh: Gender::from_label(&row.gioi_tinh),
                ngay_sinh: row.ngay_sinh,
                sdt: row.sdt,
                can_cuoc: CanCuoc {
                    so_the: row.can_cuoc_so_the,
                    ngay_cap: row.can_cuoc_ngay_cap,
                    noi_cap: row.can_cuoc_noi_cap,
                },
                trinh_do_chuyen_mon: TrinhDoChuyenMon {
                    loai_bang: row.loai_bang,
                    nam_tot_nghiep: row.nam_tot_nghiep,
                    chuyen_nganh: row.chuyen_nganh,
                    truong_dai_hoc: row.truong_dai_hoc,
                },
                ma_so_bhxh: row.ma_so_bhxh,
                ma_so_thue: row.ma_so_thue,
                que_quan: row.que_quan,
                dia_chi_hien_tai: row.dia_chi_hien_tai,
                thoi_gian_bat_dau_lam_viec: row.thoi_gian_bat_dau_lam_viec,
                phan_to: row.phan_to,
                dia_chi_ip: row.dia_chi_ip,
                email: row.email,
                ghi_chu: row.ghi_chu,
                department: row.department_id,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Binds the draft in `DRAFT_COLUMNS` order.
fn bind_draft<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    draft: &'q EmployeeDraft,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(draft.stt)
        .bind(draft.ho_ten.as_str())
        .bind(draft.chuc_danh.as_str())
        .bind(draft.gioi_tinh.as_str())
        .bind(draft.ngay_sinh)
        .bind(draft.sdt.as_str())
        .bind(draft.can_cuoc.so_the.as_str())
        .bind(draft.can_cuoc.ngay_cap)
        .bind(draft.can_cuoc.noi_cap.as_str())
        .bind(draft.trinh_do_chuyen_mon.loai_bang.as_str())
        .bind(draft.trinh_do_chuyen_mon.nam_tot_nghiep.as_deref())
        .bind(draft.trinh_do_chuyen_mon.chuyen_nganh.as_str())
        .bind(draft.trinh_do_chuyen_mon.truong_dai_hoc.as_str())
        .bind(draft.ma_so_bhxh.as_str())
        .bind(draft.ma_so_thue.as_str())
        .bind(draft.que_quan.as_str())
        .bind(draft.dia_chi_hien_tai.as_str())
        .bind(draft.thoi_gian_bat_dau_lam_viec)
        .bind(draft.phan_to.as_str())
        .bind(draft.dia_chi_ip.as_str())
        .bind(draft.email.as_str())
        .bind(draft.ghi_chu.as_str())
        .bind(draft.department)
}

pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        PgEmployeeStore { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees ORDER BY stt", *SELECT_COLUMNS);
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn list_by_department(&self, department_id: Uuid) -> Result<Vec<Employee>, StoreError> {
        let sql = format!(
            "SELECT {} FROM employees WHERE department_id = $1 ORDER BY stt",
            *SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(department_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, employee_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE employee_id = $1", *SELECT_COLUMNS);
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    async fn find_one_by_stt(&self, stt: i64) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {} FROM employees WHERE stt = $1", *SELECT_COLUMNS);
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(stt)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    async fn create(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError> {
        let sql = format!("{} RETURNING {}", *INSERT_SQL, *SELECT_COLUMNS);
        let now = Utc::now();
        let query = sqlx::query_as::<_, EmployeeRow>(&sql).bind(Uuid::new_v4());
        let row = bind_draft(query, draft)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_by_id(&self, employee_id: Uuid, draft: &EmployeeDraft) -> Result<Option<Employee>, StoreError> {
        let query = sqlx::query_as::<_, EmployeeRow>(UPDATE_SQL.as_str()).bind(employee_id);
        let row = bind_draft(query, draft)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    async fn delete_by_id(&self, employee_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = $1")
            .bind(employee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_department(&self, department_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE department_id = $1")
            .bind(department_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Single `INSERT .. ON CONFLICT (stt)` statement, so two writers racing
    /// on one `stt` cannot both insert.
    async fn upsert_by_stt(&self, draft: &EmployeeDraft) -> Result<UpsertOutcome, StoreError> {
        let now = Utc::now();
        let query = sqlx::query_as::<_, (Uuid, bool)>(UPSERT_SQL.as_str()).bind(Uuid::new_v4());
        let (employee_id, inserted) = bind_draft(query, draft)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(if inserted {
            UpsertOutcome::Created(employee_id)
        } else {
            UpsertOutcome::Updated(employee_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_statement_has_one_placeholder_per_column() {
        assert!(INSERT_SQL.contains("$26)"));
        assert!(!INSERT_SQL.contains("$27"));
        assert!(INSERT_SQL.starts_with("INSERT INTO employees (employee_id, stt, ho_ten,"));
    }

    #[test]
    fn update_statement_keys_on_employee_id() {
        assert!(UPDATE_SQL.contains("stt = $2"));
        assert!(UPDATE_SQL.contains("department_id = $24"));
        assert!(UPDATE_SQL.contains("updated_at = $25 WHERE employee_id = $1"));
        assert!(!UPDATE_SQL.contains("created_at ="));
    }

    #[test]
    fn upsert_keeps_stt_and_creation_time() {
        assert!(UPSERT_SQL.contains("ON CONFLICT (stt) DO UPDATE SET ho_ten = EXCLUDED.ho_ten"));
        assert!(!UPSERT_SQL.contains("stt = EXCLUDED.stt"));
        assert!(!UPSERT_SQL.contains("created_at = EXCLUDED"));
        assert!(UPSERT_SQL.ends_with("(xmax = 0) AS inserted"));
    }
}
