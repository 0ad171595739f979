#![cfg(feature = "web")]

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::error::{AppError, AppResult};
use crate::record::{RECORD_HEADERS, ScoreRecord};

/// Convert score records to an XLSX workbook
///
/// One sheet with the same header row and column order as the record file.
/// Numeric columns are written as numbers so they can be summed in Excel.
pub fn to_xlsx(records: &[ScoreRecord]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    write_rows(&mut worksheet, records).map_err(export_error)?;
    workbook.push_worksheet(worksheet);

    workbook.save_to_buffer().map_err(export_error)
}

fn write_rows(worksheet: &mut Worksheet, records: &[ScoreRecord]) -> Result<(), XlsxError> {
    for (col, header) in RECORD_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, record.student.as_str())?;
        worksheet.write_string(row, 1, record.grade.as_str())?;
        worksheet.write_string(row, 2, record.class.as_str())?;
        worksheet.write_string(row, 3, record.month.as_str())?;
        worksheet.write_string(row, 4, record.unit.as_str())?;
        worksheet.write_string(row, 5, record.term.as_str())?;
        worksheet.write_number(row, 6, record.total_questions as f64)?;
        worksheet.write_number(row, 7, record.correct_questions as f64)?;
        worksheet.write_number(row, 8, record.accuracy)?;
        worksheet.write_number(row, 9, record.unit_score)?;
        worksheet.write_number(row, 10, record.progress)?;
        worksheet.write_string(row, 11, record.comment.as_str())?;
        worksheet.write_string(row, 12, record.author_id.as_str())?;
        worksheet.write_string(row, 13, record.written_at.as_str())?;
    }

    Ok(())
}

fn export_error(err: XlsxError) -> AppError {
    AppError::Export(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_is_a_zip_container() {
        let record = ScoreRecord {
            student: "김민지".to_string(),
            grade: "5".to_string(),
            class: "A".to_string(),
            month: "2025-10".to_string(),
            unit: "초5-2 분수의 곱셈".to_string(),
            term: "초5-2".to_string(),
            total_questions: 20,
            correct_questions: 18,
            accuracy: 90.0,
            unit_score: 95.0,
            progress: 40.0,
            comment: String::new(),
            author_id: "t01".to_string(),
            written_at: "2025-10-03T14:05:09.000120".to_string(),
        };

        let bytes = to_xlsx(&[record]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_export_still_has_headers_sheet() {
        let bytes = to_xlsx(&[]).unwrap();
        assert!(!bytes.is_empty());
    }
}
