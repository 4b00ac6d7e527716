use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::import::mapper::HEADERS;

pub const TEMPLATE_FILE_NAME: &str = "template_nhan_vien.xlsx";
pub const TEMPLATE_SHEET_NAME: &str = "Nhân viên";

/// Empty import workbook: one sheet whose first row carries the recognised
/// headers in template order.
pub fn build_template() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(TEMPLATE_SHEET_NAME)?;
    for (col, header) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
        worksheet.set_column_width(col, (header.chars().count() + 4) as f64)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save_to_buffer()
}
