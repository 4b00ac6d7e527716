use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde_json::Value;
use validator::{Validate, ValidationError};
use crate::import::dates::{self, DateParser};
use crate::models::department::Department;
use crate::models::import::CellValue;

/// JSON pointers of the date fields in an employee request body.
const DATE_FIELDS: [&str; 3] = ["/ngaySinh", "/thoiGianBatDauLamViec", "/canCuoc/ngayCap"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[serde(rename = "Nam")]
    Nam,
    #[serde(rename = "Nữ")]
    Nu,
    #[default]
    #[serde(rename = "Khác")]
    Khac,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Nam => "Nam",
            Gender::Nu => "Nữ",
            Gender::Khac => "Khác",
        }
    }

    /// Unknown or blank labels fall back to `Khác`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "nam" => Gender::Nam,
            "nữ" => Gender::Nu,
            _ => Gender::Khac,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CanCuoc {
    #[serde(default)]
    pub so_the: String,
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    pub ngay_cap: Option<DateTime<Utc>>,
    #[serde(default)]
    pub noi_cap: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrinhDoChuyenMon {
    #[serde(default)]
    pub loai_bang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nam_tot_nghiep: Option<String>,
    #[serde(default)]
    pub chuyen_nganh: String,
    #[serde(default)]
    pub truong_dai_hoc: String,
}

/// Every writable employee field. Serves as the import candidate and as the
/// body of create/update requests.
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    #[validate(range(min = 1))]
    pub stt: i64,
    #[validate(custom = "validate_not_blank")]
    pub ho_ten: String,
    #[serde(default)]
    pub chuc_danh: String,
    #[serde(default)]
    pub gioi_tinh: Gender,
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    pub ngay_sinh: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sdt: String,
    #[serde(default)]
    pub can_cuoc: CanCuoc,
    #[serde(default)]
    pub trinh_do_chuyen_mon: TrinhDoChuyenMon,
    #[serde(default, rename = "maSoBHXH")]
    pub ma_so_bhxh: String,
    #[serde(default)]
    pub ma_so_thue: String,
    #[serde(default)]
    pub que_quan: String,
    #[serde(default)]
    pub dia_chi_hien_tai: String,
    #[serde(default, deserialize_with = "dates::deserialize_optional")]
    pub thoi_gian_bat_dau_lam_viec: Option<DateTime<Utc>>,
    #[serde(default)]
    pub phan_to: String,
    #[serde(default, rename = "diaChiIP")]
    pub dia_chi_ip: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub ghi_chu: String,
    #[serde(skip_serializing)]
    pub department: Uuid,
}

impl EmployeeDraft {
    /// Trims every text field and lowercases the email, as the stored
    /// record expects.
    pub fn normalized(mut self) -> Self {
        fn trim(value: &mut String) {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }

        trim(&mut self.ho_ten);
        trim(&mut self.chuc_danh);
        trim(&mut self.sdt);
        trim(&mut self.can_cuoc.so_the);
        trim(&mut self.can_cuoc.noi_cap);
        trim(&mut self.trinh_do_chuyen_mon.loai_bang);
        trim(&mut self.trinh_do_chuyen_mon.chuyen_nganh);
        trim(&mut self.trinh_do_chuyen_mon.truong_dai_hoc);
        if let Some(year) = self.trinh_do_chuyen_mon.nam_tot_nghiep.as_mut() {
            trim(year);
        }
        trim(&mut self.ma_so_bhxh);
        trim(&mut self.ma_so_thue);
        trim(&mut self.que_quan);
        trim(&mut self.dia_chi_hien_tai);
        trim(&mut self.phan_to);
        trim(&mut self.dia_chi_ip);
        self.email = self.email.trim().to_lowercase();
        trim(&mut self.ghi_chu);
        self
    }

    /// Reads a request body, resolving its dates with `dates` instead of the
    /// default policy the plain `Deserialize` impl uses.
    pub fn from_json(mut body: Value, dates: &DateParser) -> Result<Self, serde_json::Error> {
        for pointer in DATE_FIELDS {
            let Some(field) = body.pointer_mut(pointer) else {
                continue;
            };
            let cell = match field {
                Value::Number(n) => n.as_f64().map(CellValue::Number),
                Value::String(text) => Some(CellValue::Text(text.clone())),
                _ => None,
            };
            if let Some(cell) = cell {
                *field = match dates.parse(&cell) {
                    Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
                    None => Value::Null,
                };
            }
        }
        serde_json::from_value(body)
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("Họ tên không được để trống"));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub employee_id: Uuid,
    #[serde(flatten)]
    pub profile: EmployeeDraft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee as returned by the API, with its department resolved.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    pub department: Option<Department>,
}

impl EmployeeView {
    pub fn new(employee: Employee, department: Option<Department>) -> Self {
        EmployeeView { employee, department }
    }
}
