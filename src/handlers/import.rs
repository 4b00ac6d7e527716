use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde_json::json;
use log::{error, info};
use crate::config::Config;
use crate::db::{DepartmentStore, EmployeeStore};
use crate::errors::AppError;
use crate::handlers::department::parse_department_id;
use crate::import::template::{build_template, TEMPLATE_FILE_NAME};
use crate::import::{CalamineReader, DateParser, Importer};
use crate::utils::upload::read_import_form;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn import_employees(
    employees: web::Data<dyn EmployeeStore>,
    departments: web::Data<dyn DepartmentStore>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = read_import_form(payload, config.max_upload_bytes).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let department_id = form
        .department_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Department ID is required".to_string()))?;
    let department_id = parse_department_id(&department_id)?;

    if departments.find_by_id(department_id).await?.is_none() {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    info!("Received import file {} ({} bytes)", file.file_name, file.bytes.len());

    let reader = CalamineReader;
    let importer = Importer::new(&**employees, &reader, DateParser::from_config(&config));
    let result = match importer.import_employees(&file.bytes, department_id).await {
        Ok(result) => result,
        Err(aborted) => {
            error!("{}", aborted);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "error": aborted.cause.to_string(),
                "result": aborted.partial,
            })));
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": "Import completed",
        "result": result,
    })))
}

pub async fn download_template() -> Result<HttpResponse, AppError> {
    let bytes = build_template()
        .map_err(|err| AppError::InternalServerError(format!("Failed to build template: {}", err)))?;

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(TEMPLATE_FILE_NAME.to_string())],
        })
        .body(bytes))
}
