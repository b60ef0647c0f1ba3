use crate::error::{ErrorCode, ScheduleError};
use crate::schedule::{DayRow, DayTable, ScheduleResult};
use itertools::Itertools;
use std::path::{Path, PathBuf};

fn row_cells(row: &DayRow) -> Vec<String> {
    let mut cells = vec![
        row.animal_id.clone(),
        row.tag.clone(),
        row.sex.clone(),
        row.genotype.clone(),
        row.cage.clone(),
        row.exit_arm.to_string(),
    ];
    cells.extend(row.trials.iter().map(|arm| arm.to_string()));
    cells
}

fn csv_error(path: &Path, err: csv::Error) -> ScheduleError {
    ScheduleError {
        code: ErrorCode::Io,
        message: format!("Could not write CSV '{}': {err}", path.display()),
    }
}

/// Tab-separated rendering of one day table, matching the on-screen
/// output the experimenters paste into their lab notebooks.
pub fn day_table_text(table: &DayTable) -> String {
    let mut lines = vec![format!("Day {} ({}):", table.day, table.kind.label())];
    lines.push(table.header.join("\t"));
    for row in &table.rows {
        lines.push(row_cells(row).iter().join("\t"));
    }
    lines.join("\n")
}

pub fn schedule_text(result: &ScheduleResult) -> String {
    result.day_tables.iter().map(day_table_text).join("\n\n")
}

/// One `ymaze_day_<n>.csv` per day. Returns the written paths.
pub fn write_day_csvs(result: &ScheduleResult, dir: &Path) -> Result<Vec<PathBuf>, ScheduleError> {
    let mut written = Vec::with_capacity(result.day_tables.len());
    for table in &result.day_tables {
        let path = dir.join(format!("ymaze_day_{}.csv", table.day));
        let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_error(&path, e))?;
        writer
            .write_record(&table.header)
            .map_err(|e| csv_error(&path, e))?;
        for row in &table.rows {
            writer
                .write_record(row_cells(row))
                .map_err(|e| csv_error(&path, e))?;
        }
        writer.flush().map_err(|e| ScheduleError {
            code: ErrorCode::Io,
            message: format!("Could not write CSV '{}': {e}", path.display()),
        })?;
        written.push(path);
    }
    Ok(written)
}

/// All days in one CSV with a leading `Day` column; the header is
/// written once.
pub fn write_combined_csv(result: &ScheduleResult, path: &Path) -> Result<(), ScheduleError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    if let Some(first) = result.day_tables.first() {
        let mut header = vec!["Day".to_string()];
        header.extend(first.header.iter().cloned());
        writer.write_record(&header).map_err(|e| csv_error(path, e))?;
    }
    for table in &result.day_tables {
        for row in &table.rows {
            let mut cells = vec![table.day.to_string()];
            cells.extend(row_cells(row));
            writer.write_record(&cells).map_err(|e| csv_error(path, e))?;
        }
    }
    writer.flush().map_err(|e| ScheduleError {
        code: ErrorCode::Io,
        message: format!("Could not write CSV '{}': {e}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::Animal;
    use crate::schedule::{ScheduleRequest, generate_schedule};

    fn sample_result() -> ScheduleResult {
        let animals: Vec<Animal> = (0..4)
            .map(|i| Animal {
                animal_id: format!("A{i}"),
                tag: format!("tag-{i}"),
                sex: if i % 2 == 0 { "Male" } else { "Female" }.to_string(),
                genotype: "WT".to_string(),
                cage: format!("C{}", i % 2),
            })
            .collect();
        generate_schedule(&ScheduleRequest {
            animals,
            learning_days: 1,
            reversal_days: 1,
            trials_per_day: 4,
            seed: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_day_table_text_shape() {
        let result = sample_result();
        let text = day_table_text(&result.day_tables[0]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Day 1 (Learning):");
        assert!(lines[1].starts_with("AnimalID\tTag\tSex\tGenotype\tCage\tExitArm\tT1"));
        assert_eq!(lines.len(), 2 + result.day_tables[0].rows.len());
        assert_eq!(lines[2].split('\t').count(), 6 + 4);
    }

    #[test]
    fn test_schedule_text_separates_days() {
        let result = sample_result();
        let text = schedule_text(&result);
        assert!(text.contains("Day 1 (Learning):"));
        assert!(text.contains("Day 2 (Reversal):"));
    }

    #[test]
    fn test_write_day_csvs_roundtrip() {
        let result = sample_result();
        let dir = tempfile::tempdir().unwrap();
        let written = write_day_csvs(&result, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("ymaze_day_1.csv"));

        let mut reader = csv::Reader::from_path(&written[0]).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            result.day_tables[0].header.iter().map(String::as_str).collect::<Vec<_>>()
        );
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), result.day_tables[0].rows.len());
        let first = &result.day_tables[0].rows[0];
        assert_eq!(&records[0][0], first.animal_id.as_str());
        assert_eq!(&records[0][5], first.exit_arm.to_string().as_str());
    }

    #[test]
    fn test_write_combined_csv_has_day_column() {
        let result = sample_result();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_days.csv");
        write_combined_csv(&result, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(&reader.headers().unwrap()[0], "Day");
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        let expected_rows: usize = result.day_tables.iter().map(|t| t.rows.len()).sum();
        assert_eq!(records.len(), expected_rows);
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[expected_rows - 1][0], "2");
    }
}
