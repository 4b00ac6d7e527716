//! In-memory stores used as test doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{DepartmentStore, EmployeeStore};
use crate::errors::StoreError;
use crate::models::department::{Department, DepartmentDraft};
use crate::models::employee::{Employee, EmployeeDraft};

#[derive(Default)]
pub struct MemoryEmployeeStore {
    employees: Mutex<Vec<Employee>>,
    failures: Mutex<HashMap<i64, StoreError>>,
    calls: AtomicUsize,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation touching `stt` fail with `error`.
    pub async fn fail_on_stt(&self, stt: i64, error: StoreError) {
        self.failures.lock().await.insert(stt, error);
    }

    pub async fn seed(&self, draft: EmployeeDraft) -> Employee {
        let now = Utc::now();
        let employee = Employee {
            employee_id: Uuid::new_v4(),
            profile: draft,
            created_at: now,
            updated_at: now,
        };
        self.employees.lock().await.push(employee.clone());
        employee
    }

    pub async fn snapshot(&self) -> Vec<Employee> {
        self.employees.lock().await.clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn check(&self, stt: i64) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().await.get(&stt) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees = self.employees.lock().await.clone();
        employees.sort_by_key(|e| e.profile.stt);
        Ok(employees)
    }

    async fn list_by_department(&self, department_id: Uuid) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<Employee> = self
            .employees
            .lock()
            .await
            .iter()
            .filter(|e| e.profile.department == department_id)
            .cloned()
            .collect();
        employees.sort_by_key(|e| e.profile.stt);
        Ok(employees)
    }

    async fn find_by_id(&self, employee_id: Uuid) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .lock()
            .await
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    async fn find_one_by_stt(&self, stt: i64) -> Result<Option<Employee>, StoreError> {
        self.check(stt).await?;
        Ok(self
            .employees
            .lock()
            .await
            .iter()
            .find(|e| e.profile.stt == stt)
            .cloned())
    }

    async fn create(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError> {
        self.check(draft.stt).await?;
        let mut employees = self.employees.lock().await;
        if employees.iter().any(|e| e.profile.stt == draft.stt) {
            return Err(StoreError::Conflict(format!("duplicate stt {}", draft.stt)));
        }
        let now = Utc::now();
        let employee = Employee {
            employee_id: Uuid::new_v4(),
            profile: draft.clone(),
            created_at: now,
            updated_at: now,
        };
        employees.push(employee.clone());
        Ok(employee)
    }

    async fn update_by_id(&self, employee_id: Uuid, draft: &EmployeeDraft) -> Result<Option<Employee>, StoreError> {
        self.check(draft.stt).await?;
        let mut employees = self.employees.lock().await;
        if employees
            .iter()
            .any(|e| e.profile.stt == draft.stt && e.employee_id != employee_id)
        {
            return Err(StoreError::Conflict(format!("duplicate stt {}", draft.stt)));
        }
        Ok(employees
            .iter_mut()
            .find(|e| e.employee_id == employee_id)
            .map(|employee| {
                employee.profile = draft.clone();
                employee.updated_at = Utc::now();
                employee.clone()
            }))
    }

    async fn delete_by_id(&self, employee_id: Uuid) -> Result<bool, StoreError> {
        let mut employees = self.employees.lock().await;
        let before = employees.len();
        employees.retain(|e| e.employee_id != employee_id);
        Ok(employees.len() != before)
    }

    async fn count_by_department(&self, department_id: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .employees
            .lock()
            .await
            .iter()
            .filter(|e| e.profile.department == department_id)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct MemoryDepartmentStore {
    departments: Mutex<Vec<Department>>,
}

impl MemoryDepartmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DepartmentStore for MemoryDepartmentStore {
    async fn list(&self) -> Result<Vec<Department>, StoreError> {
        let mut departments = self.departments.lock().await.clone();
        departments.sort_by_key(|d| d.stt);
        Ok(departments)
    }

    async fn find_by_id(&self, department_id: Uuid) -> Result<Option<Department>, StoreError> {
        Ok(self
            .departments
            .lock()
            .await
            .iter()
            .find(|d| d.department_id == department_id)
            .cloned())
    }

    async fn create(&self, draft: &DepartmentDraft) -> Result<Department, StoreError> {
        let mut departments = self.departments.lock().await;
        if departments.iter().any(|d| d.stt == draft.stt) {
            return Err(StoreError::Conflict(format!("duplicate stt {}", draft.stt)));
        }
        let now = Utc::now();
        let department = Department {
            department_id: Uuid::new_v4(),
            stt: draft.stt,
            ten: draft.ten.clone(),
            created_at: now,
            updated_at: now,
        };
        departments.push(department.clone());
        Ok(department)
    }

    async fn update_by_id(&self, department_id: Uuid, draft: &DepartmentDraft) -> Result<Option<Department>, StoreError> {
        let mut departments = self.departments.lock().await;
        Ok(departments
            .iter_mut()
            .find(|d| d.department_id == department_id)
            .map(|department| {
                department.stt = draft.stt;
                department.ten = draft.ten.clone();
                department.updated_at = Utc::now();
                department.clone()
            }))
    }

    async fn delete_by_id(&self, department_id: Uuid) -> Result<bool, StoreError> {
        let mut departments = self.departments.lock().await;
        let before = departments.len();
        departments.retain(|d| d.department_id != department_id);
        Ok(departments.len() != before)
    }
}
