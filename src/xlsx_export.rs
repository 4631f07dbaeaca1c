use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::flatten::MatchFailure;
use crate::table::{CellValue, OutputTable};

pub const MATCHES_SHEET: &str = "Matches";
pub const SKIPPED_SHEET: &str = "Skipped";
pub const RUN_SHEET: &str = "Run";

pub struct RunSummary {
    pub player: String,
    pub puuid: String,
    pub region: String,
    pub generated_at: String,
    pub match_ids: usize,
    pub matches_exported: usize,
}

pub fn write_workbook(
    path: &Path,
    table: &OutputTable,
    failures: &[MatchFailure],
    summary: &RunSummary,
) -> Result<()> {
    let mut workbook = build_workbook(table, failures, summary)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

pub fn build_workbook(
    table: &OutputTable,
    failures: &[MatchFailure],
    summary: &RunSummary,
) -> Result<Workbook> {
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(MATCHES_SHEET)?;
        write_header(sheet, table.columns(), &header)?;
        for (idx, row) in table.rows().iter().enumerate() {
            let row_idx = sheet_row(idx + 1)?;
            sheet
                .write_string(row_idx, 0, &row.match_id)
                .with_context(|| format!("write cell ({row_idx},0)"))?;
            for (col, value) in row.values.iter().enumerate() {
                let col_idx = sheet_col(col + 1)?;
                write_cell(sheet, row_idx, col_idx, value)?;
            }
        }
        sheet.set_freeze_panes(1, 0)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SKIPPED_SHEET)?;
        write_header(sheet, &["matchId".to_string(), "error".to_string()], &header)?;
        for (idx, failure) in failures.iter().enumerate() {
            let row_idx = sheet_row(idx + 1)?;
            sheet.write_string(row_idx, 0, &failure.match_id)?;
            sheet.write_string(row_idx, 1, failure.error.to_string())?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(RUN_SHEET)?;
        let rows = summary_rows(table, failures, summary);
        for (idx, (key, value)) in rows.iter().enumerate() {
            let row_idx = sheet_row(idx)?;
            sheet.write_string_with_format(row_idx, 0, *key, &header)?;
            write_cell(sheet, row_idx, 1, value)?;
        }
    }
    Ok(workbook)
}

fn summary_rows(
    table: &OutputTable,
    failures: &[MatchFailure],
    summary: &RunSummary,
) -> Vec<(&'static str, CellValue)> {
    vec![
        ("player", CellValue::Text(summary.player.clone())),
        ("puuid", CellValue::Text(summary.puuid.clone())),
        ("region", CellValue::Text(summary.region.clone())),
        ("generated_at", CellValue::Text(summary.generated_at.clone())),
        ("match_ids", count_cell(summary.match_ids)),
        ("matches_exported", count_cell(summary.matches_exported)),
        ("matches_skipped", count_cell(failures.len())),
        ("rows", count_cell(table.len())),
    ]
}

fn count_cell(n: usize) -> CellValue {
    CellValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn write_header(sheet: &mut Worksheet, columns: &[String], format: &Format) -> Result<()> {
    for (col, name) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, sheet_col(col)?, name, format)
            .with_context(|| format!("write header {name}"))?;
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    let written = match value {
        CellValue::Empty => return Ok(()),
        CellValue::Bool(b) => sheet.write_boolean(row, col, *b),
        CellValue::Int(i) => sheet.write_number(row, col, int_cell_number(*i)),
        CellValue::Float(x) => sheet.write_number(row, col, *x),
        CellValue::Text(s) => sheet.write_string(row, col, s),
    };
    written.with_context(|| format!("write cell ({row},{col})"))?;
    Ok(())
}

/// Excel stores every number as an f64. Integers beyond +/-2^53 lose their low
/// bits; match statistics stay far below that.
fn int_cell_number(value: i64) -> f64 {
    value as f64
}

fn sheet_row(idx: usize) -> Result<u32> {
    u32::try_from(idx).context("row index exceeds worksheet limits")
}

fn sheet_col(idx: usize) -> Result<u16> {
    u16::try_from(idx).context("column index exceeds worksheet limits")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riot_api::ApiError;
    use crate::schema::AttributeSchema;
    use crate::table::OutputRow;

    fn summary() -> RunSummary {
        RunSummary {
            player: "euclidean aatrox#EUW".to_string(),
            puuid: "P1".to_string(),
            region: "europe".to_string(),
            generated_at: "2026-10-17T12:00:00Z".to_string(),
            match_ids: 2,
            matches_exported: 1,
        }
    }

    #[test]
    fn workbook_serializes_to_xlsx_bytes() {
        let schema = AttributeSchema::from_names(&["kills", "win", "damagePerMinute", "championName"]);
        let mut table = OutputTable::new(&schema);
        table.extend([OutputRow {
            match_id: "EUW1_1".to_string(),
            values: vec![
                CellValue::Int(4),
                CellValue::Bool(true),
                CellValue::Empty,
                CellValue::Text("Aatrox".to_string()),
            ],
        }]);
        let failures = vec![MatchFailure {
            match_id: "EUW1_2".to_string(),
            error: ApiError::Status {
                status: 404,
                url: "m".to_string(),
                body: "not found".to_string(),
            },
        }];

        let mut workbook = build_workbook(&table, &failures, &summary()).expect("workbook");
        let bytes = workbook.save_to_buffer().expect("xlsx bytes");
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn integer_cells_are_exact_up_to_two_pow_53() {
        let max_exact = 1i64 << 53;
        assert_eq!(int_cell_number(max_exact) as i64, max_exact);
        assert_eq!(int_cell_number(-max_exact) as i64, -max_exact);
        assert_eq!(int_cell_number(1_834), 1_834.0);
    }

    #[test]
    fn summary_counts_rows_and_failures() {
        let table = OutputTable::new(&AttributeSchema::default());
        let rows = summary_rows(&table, &[], &summary());
        assert!(rows.contains(&("matches_skipped", CellValue::Int(0))));
        assert!(rows.contains(&("rows", CellValue::Int(0))));
        assert!(rows.contains(&("match_ids", CellValue::Int(2))));
    }

    #[test]
    fn empty_table_still_writes_header_only_workbook() {
        let table = OutputTable::new(&AttributeSchema::default());
        let path = std::env::temp_dir().join(format!(
            "lol_match_export_empty_{}.xlsx",
            std::process::id()
        ));
        write_workbook(&path, &table, &[], &summary()).expect("write workbook");
        let meta = std::fs::metadata(&path).expect("workbook exists");
        assert!(meta.len() > 0);
        let _ = std::fs::remove_file(&path);
    }
}
