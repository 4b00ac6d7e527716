use std::fmt;
use uuid::Uuid;

use crate::import::dates::DateParser;
use crate::models::employee::{CanCuoc, EmployeeDraft, Gender, TrinhDoChuyenMon};
use crate::models::import::{CellValue, ImportRow};

pub const COL_STT: &str = "STT";
pub const COL_HO_TEN: &str = "Họ tên";
pub const COL_CHUC_DANH: &str = "Chức danh";
pub const COL_GIOI_TINH: &str = "Giới tính";
pub const COL_NGAY_SINH: &str = "Ngày sinh";
pub const COL_SDT: &str = "SĐT";
pub const COL_SO_THE_CC: &str = "Số thẻ CC";
pub const COL_NGAY_CAP_CC: &str = "Ngày cấp CC";
pub const COL_NOI_CAP_CC: &str = "Nơi cấp CC";
pub const COL_LOAI_BANG: &str = "Loại bằng";
pub const COL_NAM_TOT_NGHIEP: &str = "Năm tốt nghiệp";
pub const COL_CHUYEN_NGANH: &str = "Chuyên ngành";
pub const COL_TRUONG_DAI_HOC: &str = "Trường Đại học";
pub const COL_MA_SO_BHXH: &str = "Mã số BHXH";
pub const COL_MA_SO_THUE: &str = "Mã số thuế";
pub const COL_QUE_QUAN: &str = "Quê quán";
pub const COL_DIA_CHI_HIEN_TAI: &str = "Địa chỉ hiện tại";
pub const COL_BAT_DAU_LAM_VIEC: &str = "Thời gian bắt đầu làm việc";
pub const COL_PHAN_TO: &str = "Phân tổ";
pub const COL_DIA_CHI_IP: &str = "Địa chỉ IP";
pub const COL_EMAIL: &str = "Địa chỉ email";
pub const COL_GHI_CHU: &str = "Ghi chú";

/// Header row of the official template, in column order.
pub const HEADERS: [&str; 22] = [
    COL_STT,
    COL_HO_TEN,
    COL_CHUC_DANH,
    COL_GIOI_TINH,
    COL_NGAY_SINH,
    COL_SDT,
    COL_SO_THE_CC,
    COL_NGAY_CAP_CC,
    COL_NOI_CAP_CC,
    COL_LOAI_BANG,
    COL_NAM_TOT_NGHIEP,
    COL_CHUYEN_NGANH,
    COL_TRUONG_DAI_HOC,
    COL_MA_SO_BHXH,
    COL_MA_SO_THUE,
    COL_QUE_QUAN,
    COL_DIA_CHI_HIEN_TAI,
    COL_BAT_DAU_LAM_VIEC,
    COL_PHAN_TO,
    COL_DIA_CHI_IP,
    COL_EMAIL,
    COL_GHI_CHU,
];

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidStt(pub String);

impl fmt::Display for InvalidStt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "STT không hợp lệ: {}", self.0)
    }
}

/// Builds the candidate record for one sheet row. `ordinal` is the 1-based
/// position of the row among data rows and stands in for a blank STT.
///
/// Only an STT that is present but not an integer is refused; every other
/// cell degrades to its default.
pub fn map_row(
    row: &ImportRow,
    ordinal: usize,
    department: Uuid,
    dates: &DateParser,
) -> Result<EmployeeDraft, InvalidStt> {
    let stt = read_stt(row.get(COL_STT), ordinal)?;
    let date = |column: &str| row.get(column).and_then(|cell| dates.parse(cell));

    let draft = EmployeeDraft {
        stt,
        ho_ten: text(row, COL_HO_TEN),
        chuc_danh: text(row, COL_CHUC_DANH),
        gioi_tinh: Gender::from_label(&text(row, COL_GIOI_TINH)),
        ngay_sinh: date(COL_NGAY_SINH),
        sdt: text(row, COL_SDT),
        can_cuoc: CanCuoc {
            so_the: text(row, COL_SO_THE_CC),
            ngay_cap: date(COL_NGAY_CAP_CC),
            noi_cap: text(row, COL_NOI_CAP_CC),
        },
        trinh_do_chuyen_mon: TrinhDoChuyenMon {
            loai_bang: text(row, COL_LOAI_BANG),
            nam_tot_nghiep: Some(text(row, COL_NAM_TOT_NGHIEP)).filter(|year| !year.is_empty()),
            chuyen_nganh: text(row, COL_CHUYEN_NGANH),
            truong_dai_hoc: text(row, COL_TRUONG_DAI_HOC),
        },
        ma_so_bhxh: text(row, COL_MA_SO_BHXH),
        ma_so_thue: text(row, COL_MA_SO_THUE),
        que_quan: text(row, COL_QUE_QUAN),
        dia_chi_hien_tai: text(row, COL_DIA_CHI_HIEN_TAI),
        thoi_gian_bat_dau_lam_viec: date(COL_BAT_DAU_LAM_VIEC),
        phan_to: text(row, COL_PHAN_TO),
        dia_chi_ip: text(row, COL_DIA_CHI_IP),
        email: text(row, COL_EMAIL),
        ghi_chu: text(row, COL_GHI_CHU),
        department,
    };

    Ok(draft.normalized())
}

fn text(row: &ImportRow, column: &str) -> String {
    match row.get(column) {
        Some(cell) if !cell.is_blank() => cell.to_text(),
        _ => String::new(),
    }
}

fn read_stt(cell: Option<&CellValue>, ordinal: usize) -> Result<i64, InvalidStt> {
    let fallback = ordinal as i64;
    let cell = match cell {
        Some(cell) if !cell.is_blank() => cell,
        _ => return Ok(fallback),
    };

    let stt = match cell {
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => *n as i64,
        CellValue::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(fallback);
            }
            trimmed
                .parse::<i64>()
                .map_err(|_| InvalidStt(raw.clone()))?
        }
        other => return Err(InvalidStt(other.to_text())),
    };

    // Stored numbers start at 1.
    match stt {
        0 => Ok(fallback),
        stt if stt < 0 => Err(InvalidStt(cell.to_text())),
        stt => Ok(stt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(cells: &[(&str, CellValue)]) -> ImportRow {
        cells
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect()
    }

    fn t(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[test]
    fn maps_the_documented_example_row() {
        let department = Uuid::new_v4();
        let input = row(&[
            (COL_STT, CellValue::Number(1.0)),
            (COL_HO_TEN, t("Nguyễn Văn A")),
            (COL_GIOI_TINH, t("Nam")),
            (COL_NGAY_SINH, t("15/03/1990")),
        ]);

        let draft = map_row(&input, 1, department, &DateParser::default()).unwrap();

        assert_eq!(draft.stt, 1);
        assert_eq!(draft.ho_ten, "Nguyễn Văn A");
        assert_eq!(draft.gioi_tinh, Gender::Nam);
        assert_eq!(draft.ngay_sinh, Some(Utc.with_ymd_and_hms(1990, 3, 15, 0, 0, 0).unwrap()));
        assert_eq!(draft.department, department);
        assert_eq!(draft.chuc_danh, "");
        assert_eq!(draft.trinh_do_chuyen_mon.nam_tot_nghiep, None);
    }

    #[test]
    fn blank_cells_take_defaults() {
        let input = row(&[(COL_HO_TEN, t("Trần B")), (COL_STT, CellValue::Empty)]);
        let draft = map_row(&input, 4, Uuid::nil(), &DateParser::default()).unwrap();

        assert_eq!(draft.stt, 4);
        assert_eq!(draft.gioi_tinh, Gender::Khac);
        assert_eq!(draft.ngay_sinh, None);
        assert_eq!(draft.can_cuoc, CanCuoc::default());
        assert_eq!(draft.email, "");
    }

    #[test]
    fn numeric_identifiers_are_kept_as_text() {
        let input = row(&[
            (COL_HO_TEN, t("Lê C")),
            (COL_SDT, CellValue::Number(912345678.0)),
            (COL_SO_THE_CC, CellValue::Number(1190000123.0)),
            (COL_MA_SO_THUE, CellValue::Number(8012345678.0)),
            (COL_MA_SO_BHXH, CellValue::Number(7912345678.0)),
            (COL_NAM_TOT_NGHIEP, CellValue::Number(2012.0)),
        ]);
        let draft = map_row(&input, 1, Uuid::nil(), &DateParser::default()).unwrap();

        assert_eq!(draft.sdt, "912345678");
        assert_eq!(draft.can_cuoc.so_the, "1190000123");
        assert_eq!(draft.ma_so_thue, "8012345678");
        assert_eq!(draft.ma_so_bhxh, "7912345678");
        assert_eq!(draft.trinh_do_chuyen_mon.nam_tot_nghiep.as_deref(), Some("2012"));
    }

    #[test]
    fn serial_dates_and_unknown_gender() {
        let input = row(&[
            (COL_HO_TEN, t("Phạm D")),
            (COL_GIOI_TINH, t("Female")),
            (COL_NGAY_SINH, CellValue::Number(43831.0)),
            (COL_BAT_DAU_LAM_VIEC, t("không rõ")),
        ]);
        let draft = map_row(&input, 1, Uuid::nil(), &DateParser::default()).unwrap();

        assert_eq!(draft.gioi_tinh, Gender::Khac);
        assert_eq!(draft.ngay_sinh, Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(draft.thoi_gian_bat_dau_lam_viec, None);
    }

    #[test]
    fn text_is_trimmed_and_email_lowercased() {
        let input = row(&[
            (COL_HO_TEN, t("  Võ E  ")),
            (COL_EMAIL, t(" Vo.E@Cong-Ty.VN ")),
            (COL_STT, t(" 12 ")),
        ]);
        let draft = map_row(&input, 1, Uuid::nil(), &DateParser::default()).unwrap();

        assert_eq!(draft.ho_ten, "Võ E");
        assert_eq!(draft.email, "vo.e@cong-ty.vn");
        assert_eq!(draft.stt, 12);
    }

    #[test]
    fn malformed_stt_is_refused() {
        let input = row(&[(COL_HO_TEN, t("Đỗ F")), (COL_STT, t("mười"))]);
        let err = map_row(&input, 1, Uuid::nil(), &DateParser::default()).unwrap_err();
        assert_eq!(err.to_string(), "STT không hợp lệ: mười");

        let input = row(&[(COL_HO_TEN, t("Đỗ F")), (COL_STT, CellValue::Number(2.5))]);
        assert!(map_row(&input, 1, Uuid::nil(), &DateParser::default()).is_err());
    }

    #[test]
    fn zero_stt_counts_as_blank() {
        let input = row(&[(COL_HO_TEN, t("Hồ G")), (COL_STT, CellValue::Number(0.0))]);
        let draft = map_row(&input, 9, Uuid::nil(), &DateParser::default()).unwrap();
        assert_eq!(draft.stt, 9);

        let input = row(&[(COL_HO_TEN, t("Hồ G")), (COL_STT, t(" 0 "))]);
        let draft = map_row(&input, 4, Uuid::nil(), &DateParser::default()).unwrap();
        assert_eq!(draft.stt, 4);
    }

    #[test]
    fn negative_stt_is_refused() {
        let input = row(&[(COL_HO_TEN, t("Mai H")), (COL_STT, CellValue::Number(-3.0))]);
        let err = map_row(&input, 1, Uuid::nil(), &DateParser::default()).unwrap_err();
        assert_eq!(err.to_string(), "STT không hợp lệ: -3");

        let input = row(&[(COL_HO_TEN, t("Mai H")), (COL_STT, t("-7"))]);
        let err = map_row(&input, 1, Uuid::nil(), &DateParser::default()).unwrap_err();
        assert_eq!(err.to_string(), "STT không hợp lệ: -7");
    }
}
