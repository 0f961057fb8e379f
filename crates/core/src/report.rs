//! Consolidated checklist reports and the table layout used for PDF export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::checklist::validate_kind;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Narrowest and widest PDF column, in characters.
pub const MIN_COLUMN_CHARS: usize = 4;
pub const MAX_COLUMN_CHARS: usize = 40;

/// Filters accepted by the consolidated report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub vehicle_id: Option<DbId>,
    pub checklist_kind: Option<String>,
}

impl ReportFilter {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(CoreError::Validation(format!(
                    "Report start {from} is after end {to}"
                )));
            }
        }
        if let Some(kind) = &self.checklist_kind {
            validate_kind(kind)?;
        }
        Ok(())
    }
}

/// One submission line in a report.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub submission_id: DbId,
    pub submitted_at: Timestamp,
    pub driver_name: String,
    pub vehicle_name: String,
    pub checklist_name: String,
    pub checklist_kind: String,
    pub total_items: i64,
    pub non_conforming: i64,
}

/// Submissions of a single day with aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub submissions: Vec<SubmissionSummary>,
    pub total_items: i64,
    pub non_conforming: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedReport {
    pub days: Vec<DayGroup>,
    pub submission_count: usize,
    pub total_items: i64,
    pub non_conforming: i64,
    /// Share of answered items that were conforming, in percent.
    pub conformity_rate: f64,
}

/// Percentage of conforming answers. An empty report counts as fully conforming.
pub fn conformity_rate(total_items: i64, non_conforming: i64) -> f64 {
    if total_items <= 0 {
        return 100.0;
    }
    let conforming = (total_items - non_conforming).max(0) as f64;
    (conforming / total_items as f64 * 1000.0).round() / 10.0
}

/// Group submissions by UTC day, newest day first, submissions newest first.
pub fn group_by_day(mut rows: Vec<SubmissionSummary>) -> Vec<DayGroup> {
    rows.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then(b.submission_id.cmp(&a.submission_id))
    });

    let mut days: Vec<DayGroup> = Vec::new();
    for row in rows {
        let date = row.submitted_at.date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => {
                day.total_items += row.total_items;
                day.non_conforming += row.non_conforming;
                day.submissions.push(row);
            }
            _ => days.push(DayGroup {
                date,
                total_items: row.total_items,
                non_conforming: row.non_conforming,
                submissions: vec![row],
            }),
        }
    }
    days
}

pub fn consolidate(rows: Vec<SubmissionSummary>) -> ConsolidatedReport {
    let submission_count = rows.len();
    let total_items: i64 = rows.iter().map(|r| r.total_items).sum();
    let non_conforming: i64 = rows.iter().map(|r| r.non_conforming).sum();
    ConsolidatedReport {
        days: group_by_day(rows),
        submission_count,
        total_items,
        non_conforming,
        conformity_rate: conformity_rate(total_items, non_conforming),
    }
}

/// A plain text table ready to be laid out on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Relative column widths, one per header.
    pub fn column_weights(&self) -> Vec<usize> {
        column_weights(&self.headers, &self.rows)
    }

    /// Rows with every cell cut to its column width.
    pub fn fitted_rows(&self) -> Vec<Vec<String>> {
        let widths = self.column_weights();
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, width)| truncate_cell(cell, *width))
                    .collect()
            })
            .collect()
    }
}

/// Width of each column: the longest cell (header included), clamped.
pub fn column_weights(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let widest = rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            widest.clamp(MIN_COLUMN_CHARS, MAX_COLUMN_CHARS)
        })
        .collect()
}

/// Cut `text` to `max_chars` characters, marking the cut with `…`.
pub fn truncate_cell(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Heading line for a day's table: date, submission count and totals.
pub fn day_heading(day: &DayGroup) -> String {
    format!(
        "{} | Checklists: {} | Itens: {} | Não conformes: {} | Conformidade: {:.1}%",
        day.date.format("%d/%m/%Y"),
        day.submissions.len(),
        day.total_items,
        day.non_conforming,
        conformity_rate(day.total_items, day.non_conforming)
    )
}

/// Table of one day's submissions, newest first.
pub fn day_table(day: &DayGroup) -> ReportTable {
    let headers = ["Hora", "Motorista", "Conjunto", "Checklist", "Tipo", "Itens", "NC"]
        .iter()
        .map(|h| h.to_string())
        .collect();

    let rows = day
        .submissions
        .iter()
        .map(|s| {
            vec![
                s.submitted_at.format("%H:%M").to_string(),
                s.driver_name.clone(),
                s.vehicle_name.clone(),
                s.checklist_name.clone(),
                s.checklist_kind.clone(),
                s.total_items.to_string(),
                s.non_conforming.to_string(),
            ]
        })
        .collect();

    ReportTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary(id: DbId, day: u32, hour: u32, total: i64, nc: i64) -> SubmissionSummary {
        SubmissionSummary {
            submission_id: id,
            submitted_at: Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap(),
            driver_name: format!("Driver {id}"),
            vehicle_name: "CJ-01".into(),
            checklist_name: "Diário".into(),
            checklist_kind: "daily".into(),
            total_items: total,
            non_conforming: nc,
        }
    }

    #[test]
    fn groups_by_day_newest_first() {
        let rows = vec![
            summary(1, 10, 8, 10, 1),
            summary(2, 11, 9, 10, 0),
            summary(3, 10, 17, 10, 2),
        ];
        let days = group_by_day(rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert_eq!(days[1].submissions[0].submission_id, 3);
        assert_eq!(days[1].non_conforming, 3);
        assert_eq!(days[1].total_items, 20);
    }

    #[test]
    fn consolidation_totals() {
        let report = consolidate(vec![summary(1, 10, 8, 10, 1), summary(2, 11, 9, 10, 0)]);
        assert_eq!(report.submission_count, 2);
        assert_eq!(report.total_items, 20);
        assert_eq!(report.conformity_rate, 95.0);
    }

    #[test]
    fn empty_report_is_fully_conforming() {
        let report = consolidate(Vec::new());
        assert!(report.days.is_empty());
        assert_eq!(report.conformity_rate, 100.0);
    }

    #[test]
    fn conformity_rate_rounds_to_one_decimal() {
        assert_eq!(conformity_rate(3, 1), 66.7);
    }

    #[test]
    fn filter_rejects_inverted_range() {
        let filter = ReportFilter {
            from: NaiveDate::from_ymd_opt(2026, 3, 11),
            to: NaiveDate::from_ymd_opt(2026, 3, 10),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
        let filter = ReportFilter {
            checklist_kind: Some("yearly".into()),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn column_weights_follow_content() {
        let headers = vec!["NC".to_string(), "Motorista".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Ana".to_string()],
            vec!["12".to_string(), "x".repeat(80)],
        ];
        assert_eq!(column_weights(&headers, &rows), vec![MIN_COLUMN_CHARS, MAX_COLUMN_CHARS]);
    }

    #[test]
    fn truncation_marks_cut() {
        assert_eq!(truncate_cell("Maria", 10), "Maria");
        assert_eq!(truncate_cell("Maria Souza", 6), "Maria…");
        assert_eq!(truncate_cell("João", 0), "");
    }

    #[test]
    fn one_table_per_day_with_subtotals() {
        let report = consolidate(vec![
            summary(1, 10, 8, 10, 1),
            summary(2, 11, 9, 10, 0),
            summary(3, 10, 17, 10, 2),
        ]);
        let tables: Vec<ReportTable> = report.days.iter().map(day_table).collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[1].rows.len(), 2);
        assert_eq!(tables[1].rows[0][0], "17:00");
        assert_eq!(tables[1].fitted_rows()[1][6], "1");
        assert_eq!(
            day_heading(&report.days[1]),
            "10/03/2026 | Checklists: 2 | Itens: 20 | Não conformes: 3 | Conformidade: 85.0%"
        );
    }
}
