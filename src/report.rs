use std::collections::BTreeSet;

use crate::progress::{max_progress, previous_progress};
use crate::record::ScoreRecord;
use crate::term::extract_term;
use crate::users::UserAccount;

/// Everything the report view shows for one student and month
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub student: String,
    pub month: String,
    /// Selectable students, sorted
    pub students: Vec<String>,
    /// Selectable months for `student`, sorted
    pub months: Vec<String>,
    pub rows: Vec<ScoreRecord>,
    pub term: String,
    pub previous: f64,
    pub current: f64,
}

impl ProgressReport {
    /// One-line summary under the chart. Progress values appear as stored.
    pub fn caption(&self) -> String {
        format!(
            "Term: {} | last month {:?}% → this month {:?}%",
            self.term, self.previous, self.current
        )
    }
}

/// Rows a user may see: administrators see everything, instructors their own entries
pub fn visible_records<'a>(records: &'a [ScoreRecord], viewer: &UserAccount) -> Vec<&'a ScoreRecord> {
    if viewer.role.is_admin() {
        records.iter().collect()
    } else {
        records.iter().filter(|r| r.author_id == viewer.id).collect()
    }
}

/// Assemble the report for the requested student and month
///
/// Unknown or missing selections fall back to the first option, the way a
/// select box starts out. Returns `None` when the viewer has no rows at all.
/// The previous month is looked up across all records, not only the viewer's.
pub fn build_report(
    all: &[ScoreRecord],
    viewer: &UserAccount,
    student: Option<&str>,
    month: Option<&str>,
) -> Option<ProgressReport> {
    let visible = visible_records(all, viewer);
    if visible.is_empty() {
        return None;
    }

    let students = distinct_sorted(visible.iter().map(|r| r.student.as_str()));
    let student = pick(&students, student)?;

    let months = distinct_sorted(
        visible
            .iter()
            .filter(|r| r.student == student)
            .map(|r| r.month.as_str()),
    );
    let month = pick(&months, month)?;

    let rows: Vec<ScoreRecord> = visible
        .iter()
        .filter(|r| r.student == student && r.month == month)
        .map(|r| (*r).clone())
        .collect();

    // Term comes from the first row's unit name, not the stored column
    let term = rows.first().map(|r| extract_term(&r.unit)).unwrap_or_default();
    let current = max_progress(&rows);
    let previous = previous_progress(all, &student, &term, &month);

    Some(ProgressReport {
        student,
        month,
        students,
        months,
        rows,
        term,
        previous,
        current,
    })
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn pick(options: &[String], requested: Option<&str>) -> Option<String> {
    requested
        .and_then(|wanted| options.iter().find(|o| o.as_str() == wanted))
        .or_else(|| options.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::Role;

    fn user(id: &str, role: Role) -> UserAccount {
        UserAccount {
            id: id.to_string(),
            name: id.to_string(),
            role,
            password: "pw".to_string(),
        }
    }

    fn record(student: &str, month: &str, unit: &str, progress: f64, author: &str) -> ScoreRecord {
        ScoreRecord {
            student: student.to_string(),
            grade: "5".to_string(),
            class: "A".to_string(),
            month: month.to_string(),
            unit: unit.to_string(),
            term: extract_term(unit),
            total_questions: 20,
            correct_questions: 15,
            accuracy: 75.0,
            unit_score: 80.0,
            progress,
            comment: String::new(),
            author_id: author.to_string(),
            written_at: "2025-01-01T00:00:00.000000".to_string(),
        }
    }

    fn dataset() -> Vec<ScoreRecord> {
        vec![
            record("민지", "2025-01", "초5-2 분수", 30.0, "t01"),
            record("민지", "2025-02", "초5-2 분수의 곱셈", 55.0, "t02"),
            record("민지", "2025-02", "초5-2 소수", 50.0, "t01"),
            record("서준", "2025-02", "초6-1 비례", 20.0, "t02"),
        ]
    }

    #[test]
    fn instructors_only_see_their_rows() {
        let records = dataset();
        assert_eq!(visible_records(&records, &user("t01", Role::Instructor)).len(), 2);
        assert_eq!(visible_records(&records, &user("boss", Role::Admin)).len(), 4);
        assert!(visible_records(&records, &user("t09", Role::Instructor)).is_empty());
    }

    #[test]
    fn no_visible_rows_means_no_report() {
        let records = dataset();
        assert!(build_report(&records, &user("t09", Role::Instructor), None, None).is_none());
        assert!(build_report(&[], &user("boss", Role::Admin), None, None).is_none());
    }

    #[test]
    fn admin_report_for_selected_month() {
        let records = dataset();
        let report =
            build_report(&records, &user("boss", Role::Admin), Some("민지"), Some("2025-02")).unwrap();

        assert_eq!(report.students, vec!["민지", "서준"]);
        assert_eq!(report.months, vec!["2025-01", "2025-02"]);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.term, "초5-2");
        assert_eq!(report.current, 55.0);
        assert_eq!(report.previous, 30.0);
        assert_eq!(report.caption(), "Term: 초5-2 | last month 30.0% → this month 55.0%");
    }

    #[test]
    fn defaults_to_first_student_and_month() {
        let records = dataset();
        let report = build_report(&records, &user("boss", Role::Admin), None, Some("1999-01")).unwrap();
        assert_eq!(report.student, "민지");
        assert_eq!(report.month, "2025-01");
        assert_eq!(report.previous, 0.0);
        assert_eq!(report.current, 30.0);
    }

    #[test]
    fn previous_progress_uses_all_authors() {
        let records = dataset();
        // t02 wrote the February rows for 민지 but t01 authored the January one
        let report =
            build_report(&records, &user("t02", Role::Instructor), Some("민지"), Some("2025-02")).unwrap();
        assert_eq!(report.months, vec!["2025-02"]);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.current, 55.0);
        assert_eq!(report.previous, 30.0);
    }

    #[test]
    fn caption_shows_stored_progress_unrounded() {
        let records = vec![
            record("민지", "2025-01", "초5-2 분수", 33.33, "t01"),
            record("민지", "2025-02", "초5-2 분수", 47.25, "t01"),
        ];
        let report =
            build_report(&records, &user("t01", Role::Instructor), None, Some("2025-02")).unwrap();
        assert_eq!(report.caption(), "Term: 초5-2 | last month 33.33% → this month 47.25%");
    }
}
