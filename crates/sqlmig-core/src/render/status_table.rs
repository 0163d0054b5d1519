use crate::model::LedgerRecord;

const VERSION_WIDTH: usize = 7;
const COLUMN_WIDTH: usize = 19;

/// Timestamp layout used in the table (exactly `COLUMN_WIDTH` chars)
pub const CHANGED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render ledger records as a fixed-width table
///
/// One line per element, ready to be sent to a reporter line by line.
/// Records are rendered in the order given (the ledger returns them
/// version descending). The name column grows to fit the longest name.
///
/// ```text
/// ._________._____________________._____________________._____________________.
/// | Version | Name                | Status              | Changed at          |
/// | 2       | add_table           | applied             | 2024-01-01 10:00:05 |
/// |_________|_____________________|_____________________|_____________________|
/// ```
pub fn render_status_table(records: &[LedgerRecord]) -> Vec<String> {
    let name_width = records
        .iter()
        .map(|r| r.name.chars().count())
        .fold(COLUMN_WIDTH, usize::max);
    let widths = [VERSION_WIDTH, name_width, COLUMN_WIDTH, COLUMN_WIDTH];

    let mut lines = Vec::with_capacity(records.len() + 3);
    lines.push(border('.', &widths));
    lines.push(format!(
        "| {:<vw$} | {:<nw$} | {:<cw$} | {:<cw$} |",
        "Version",
        "Name",
        "Status",
        "Changed at",
        vw = VERSION_WIDTH,
        nw = name_width,
        cw = COLUMN_WIDTH,
    ));

    for record in records {
        lines.push(format!(
            "| {:<vw$} | {:<nw$} | {:<cw$} | {:<cw$} |",
            record.version,
            record.name,
            record.status.as_str(),
            record.status_changed_at.format(CHANGED_AT_FORMAT).to_string(),
            vw = VERSION_WIDTH,
            nw = name_width,
            cw = COLUMN_WIDTH,
        ));
    }

    lines.push(border('|', &widths));
    lines
}

fn border(edge: char, widths: &[usize]) -> String {
    let mut line = String::new();
    line.push(edge);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push(edge);
        }
        line.push_str(&"_".repeat(width + 2));
    }
    line.push(edge);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_table_has_frame_only() {
        let lines = render_status_table(&[]);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Changed at"));
    }

    #[test]
    fn test_rows_keep_given_order() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 5).unwrap();
        let records = vec![
            LedgerRecord::new(2, "add_table", Status::Applied, t),
            LedgerRecord::new(1, "init", Status::Reverted, t),
        ];

        let lines = render_status_table(&records);
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("add_table"));
        assert!(lines[2].contains("applied"));
        assert!(lines[2].contains("2024-01-01 10:00:05"));
        assert!(lines[3].contains("init"));
        assert!(lines[3].contains("reverted"));
    }

    #[test]
    fn test_long_names_widen_column_and_stay_distinct() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 5).unwrap();
        let records = vec![
            LedgerRecord::new(2, "add_customer_index_on_email", Status::Applied, t),
            LedgerRecord::new(1, "add_customer_index_on_phone", Status::Applied, t),
        ];

        let lines = render_status_table(&records);
        assert!(lines[2].contains("add_customer_index_on_email"));
        assert!(lines[3].contains("add_customer_index_on_phone"));
        for line in &lines {
            assert_eq!(line.len(), lines[0].len());
        }
    }

    #[test]
    fn test_short_names_keep_default_width() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 5).unwrap();
        let short = render_status_table(&[LedgerRecord::new(1, "init", Status::Applied, t)]);
        assert_eq!(short[0], render_status_table(&[])[0]);
    }
}
