use rust_xlsxwriter::{Format, Workbook, XlsxError};
use time::OffsetDateTime;

use crate::clock::{fmt_compact_stamp, fmt_slashed_datetime, parse_instant, Zone};
use crate::report::ReportCommentRow;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Комментарии";

const COLUMNS: [(&str, f64); 8] = [
    ("Текст комментария", 58.0),
    ("Категория комментария", 28.0),
    ("Дата и время публикации", 24.0),
    ("Количество лайков", 18.0),
    ("Имя автора комментария", 30.0),
    ("Ссылка на VK-профиль автора", 38.0),
    ("Ссылка на пост", 38.0),
    ("Ссылка на комментарий", 38.0),
];

pub fn export_file_name(generated_at: OffsetDateTime, zone: &Zone) -> String {
    format!(
        "cityfeedback-comments-{}.xlsx",
        fmt_compact_stamp(zone.local(generated_at))
    )
}

fn published_cell(published_at: &str, zone: &Zone) -> String {
    match parse_instant(published_at) {
        Some(t) => fmt_slashed_datetime(zone.local(t)),
        None => published_at.to_string(),
    }
}

/// Renders the comment report as a single-sheet workbook.
pub fn build_workbook(rows: &[ReportCommentRow], zone: &Zone) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, *width)?;
    }

    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, r.comment_text.as_str())?;
        sheet.write_string(row, 1, r.category)?;
        sheet.write_string(row, 2, published_cell(&r.published_at, zone))?;
        sheet.write_number(row, 3, r.likes_count as f64)?;
        sheet.write_string(row, 4, r.author_name.as_str())?;
        sheet.write_string(row, 5, r.author_profile_url.as_str())?;
        sheet.write_string(row, 6, r.post_url.as_str())?;
        sheet.write_string(row, 7, r.comment_url.as_str())?;
    }

    workbook.save_to_buffer()
}
