use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;
use crate::db::{DepartmentStore, EmployeeStore};
use crate::errors::AppError;
use crate::models::department::DepartmentDraft;
use crate::utils::validation::validate_payload;

pub(crate) fn parse_department_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("Invalid department ID".to_string()))
}

pub async fn get_departments(
    departments: web::Data<dyn DepartmentStore>,
) -> Result<HttpResponse, AppError> {
    let departments = departments.list().await?;
    Ok(HttpResponse::Ok().json(departments))
}

pub async fn get_department(
    departments: web::Data<dyn DepartmentStore>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_department_id(&department_id.into_inner())?;

    let department = departments
        .find_by_id(department_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    Ok(HttpResponse::Ok().json(department))
}

pub async fn create_department(
    departments: web::Data<dyn DepartmentStore>,
    new_department: web::Json<DepartmentDraft>,
) -> Result<HttpResponse, AppError> {
    let new_department = new_department.into_inner().normalized();
    validate_payload(&new_department)?;

    let department = departments.create(&new_department).await?;

    Ok(HttpResponse::Created().json(department))
}

pub async fn update_department(
    departments: web::Data<dyn DepartmentStore>,
    department_id: web::Path<String>,
    updates: web::Json<DepartmentDraft>,
) -> Result<HttpResponse, AppError> {
    let updates = updates.into_inner().normalized();
    validate_payload(&updates)?;

    let department_id = parse_department_id(&department_id.into_inner())?;

    let department = departments
        .update_by_id(department_id, &updates)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;

    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    departments: web::Data<dyn DepartmentStore>,
    employees: web::Data<dyn EmployeeStore>,
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department_id = parse_department_id(&department_id.into_inner())?;

    if departments.find_by_id(department_id).await?.is_none() {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    if employees.count_by_department(department_id).await? > 0 {
        return Err(AppError::Conflict("Department still contains employees".to_string()));
    }

    departments.delete_by_id(department_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted successfully",
    })))
}
