use std::path::Path;

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;

use crate::errors::AppError;

const EXCEL_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

// Workbooks are ZIP (xlsx) or OLE (xls) containers; infer may report
// either the specific type or just the container.
const EXCEL_MIME_TYPES: [&str; 4] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/zip",
    "application/x-ole-storage",
];

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct ImportForm {
    pub file: Option<UploadedFile>,
    pub department_id: Option<String>,
}

/// Drains the multipart body of an import request, keeping the `file` and
/// `departmentId` fields.
pub async fn read_import_form(mut payload: Multipart, max_bytes: usize) -> Result<ImportForm, AppError> {
    let mut form = ImportForm::default();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|err| AppError::BadRequest(err.to_string()))?;
        let (name, file_name) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().unwrap_or_default().to_string(),
                disposition.get_filename().map(str::to_string),
            )
        };

        let bytes = read_field(&mut field, max_bytes).await?;
        match name.as_str() {
            "file" => {
                let file_name = file_name.unwrap_or_default();
                ensure_excel(&file_name, &bytes)?;
                form.file = Some(UploadedFile { file_name, bytes });
            }
            "departmentId" => {
                form.department_id = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| AppError::BadRequest(err.to_string()))?;
        if bytes.len() + chunk.len() > max_bytes {
            return Err(AppError::BadRequest(format!(
                "File size exceeds {} KiB limit",
                max_bytes / 1024
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub fn ensure_excel(file_name: &str, bytes: &[u8]) -> Result<(), AppError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if !matches!(extension.as_deref(), Some(ext) if EXCEL_EXTENSIONS.contains(&ext)) {
        return Err(AppError::BadRequest("Only Excel files are allowed".to_string()));
    }

    if let Some(kind) = infer::get(bytes) {
        if !EXCEL_MIME_TYPES.contains(&kind.mime_type()) {
            return Err(AppError::BadRequest("Only Excel files are allowed".to_string()));
        }
    }

    Ok(())
}
