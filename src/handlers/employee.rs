use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use uuid::Uuid;
use crate::config::Config;
use crate::db::{DepartmentStore, EmployeeStore};
use crate::errors::AppError;
use crate::handlers::department::parse_department_id;
use crate::import::DateParser;
use crate::models::department::Department;
use crate::models::employee::{Employee, EmployeeDraft, EmployeeView};
use crate::utils::validation::validate_payload;

fn parse_employee_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("Invalid employee ID".to_string()))
}

fn read_draft(body: Value, config: &Config) -> Result<EmployeeDraft, AppError> {
    EmployeeDraft::from_json(body, &DateParser::from_config(config))
        .map(EmployeeDraft::normalized)
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

/// Shared checks for create and update: valid body, known department, and
/// an `stt` not held by a different employee. Returns the department.
async fn check_draft(
    employees: &dyn EmployeeStore,
    departments: &dyn DepartmentStore,
    draft: &EmployeeDraft,
    employee_id: Option<Uuid>,
) -> Result<Department, AppError> {
    validate_payload(draft)?;

    let department = departments
        .find_by_id(draft.department)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    if let Some(holder) = employees.find_one_by_stt(draft.stt).await? {
        if Some(holder.employee_id) != employee_id {
            return Err(AppError::Conflict("Employee STT already exists".to_string()));
        }
    }

    Ok(department)
}

async fn with_departments(
    departments: &dyn DepartmentStore,
    employees: Vec<Employee>,
) -> Result<Vec<EmployeeView>, AppError> {
    let by_id: HashMap<Uuid, Department> = departments
        .list()
        .await?
        .into_iter()
        .map(|department| (department.department_id, department))
        .collect();

    Ok(employees
        .into_iter()
        .map(|employee| {
            let department = by_id.get(&employee.profile.department).cloned();
            EmployeeView::new(employee, department)
        })
        .collect())
}

pub async fn get_employees(
    employees: web::Data<dyn EmployeeStore>,
    departments: web::Data<dyn DepartmentStore>,
) -> Result<HttpResponse, AppError> {
    let employees = employees.list().await?;
    Ok(HttpResponse::Ok().json(with_departments(&**departments, employees).await?))
}

pub async fn get_employee(
    employees: web::Data<dyn EmployeeStore>,
    departments: web::Data<dyn DepartmentStore>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_employee_id(&employee_id.into_inner())?;

    let employee = employees
        .find_by_id(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    let department = departments.find_by_id(employee.profile.department).await?;

    Ok(HttpResponse::Ok().json(EmployeeView::new(employee, department)))
}

pub async fn get_employees_by_department(
    employees: web::Data<dyn EmployeeStore>,
    departments: web::Data<dyn DepartmentStore>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_department_id(&department_id.into_inner())?;
    let department = departments.find_by_id(department_id).await?;

    let employees: Vec<EmployeeView> = employees
        .list_by_department(department_id)
        .await?
        .into_iter()
        .map(|employee| EmployeeView::new(employee, department.clone()))
        .collect();

    Ok(HttpResponse::Ok().json(employees))
}

pub async fn create_employee(
    employees: web::Data<dyn EmployeeStore>,
    departments: web::Data<dyn DepartmentStore>,
    config: web::Data<Config>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let new_employee = read_draft(body.into_inner(), &config)?;
    let department = check_draft(&**employees, &**departments, &new_employee, None).await?;

    let employee = employees.create(&new_employee).await?;

    Ok(HttpResponse::Created().json(EmployeeView::new(employee, Some(department))))
}

pub async fn update_employee(
    employees: web::Data<dyn EmployeeStore>,
    departments: web::Data<dyn DepartmentStore>,
    config: web::Data<Config>,
    employee_id: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_employee_id(&employee_id.into_inner())?;
    let updates = read_draft(body.into_inner(), &config)?;
    let department = check_draft(&**employees, &**departments, &updates, Some(employee_id)).await?;

    let employee = employees
        .update_by_id(employee_id, &updates)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(HttpResponse::Ok().json(EmployeeView::new(employee, Some(department))))
}

pub async fn delete_employee(
    employees: web::Data<dyn EmployeeStore>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_employee_id(&employee_id.into_inner())?;

    if !employees.delete_by_id(employee_id).await? {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}
