use crate::record::ScoreRecord;

/// Progress a student had reached in a term before the given month
///
/// Looks at the latest month strictly before `month` that has any record for
/// the student and term, and returns the highest progress recorded in it.
/// Several rows in that month are resolved by maximum, not by write order.
///
/// # Arguments
/// * `records` - Every stored record, regardless of author
/// * `student` - Student name to match exactly
/// * `term` - Term label such as "초5-2"
/// * `month` - The month being reported, as YYYY-MM
///
/// # Returns
/// * The highest progress in the latest earlier month, or 0.0 when there is none
pub fn previous_progress(records: &[ScoreRecord], student: &str, term: &str, month: &str) -> f64 {
    let matching: Vec<&ScoreRecord> = records
        .iter()
        .filter(|r| r.student == student && r.term == term)
        .collect();

    // YYYY-MM compares chronologically as a string
    let last_month = matching
        .iter()
        .map(|r| r.month.as_str())
        .filter(|m| *m < month)
        .max();

    match last_month {
        Some(last) => max_progress(matching.iter().copied().filter(|r| r.month == last)),
        None => 0.0,
    }
}

/// Highest progress among the given rows, 0.0 for none
pub fn max_progress<'a>(records: impl IntoIterator<Item = &'a ScoreRecord>) -> f64 {
    records
        .into_iter()
        .map(|r| r.progress)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(student: &str, term: &str, month: &str, progress: f64) -> ScoreRecord {
        ScoreRecord {
            student: student.to_string(),
            grade: "5".to_string(),
            class: "A".to_string(),
            month: month.to_string(),
            unit: format!("{term} 단원"),
            term: term.to_string(),
            total_questions: 20,
            correct_questions: 18,
            accuracy: 90.0,
            unit_score: 90.0,
            progress,
            comment: String::new(),
            author_id: "t01".to_string(),
            written_at: "2025-01-01T00:00:00.000000".to_string(),
        }
    }

    #[test]
    fn no_history_is_zero() {
        assert_eq!(previous_progress(&[], "A", "초5-2", "2025-03"), 0.0);

        let records = vec![record("A", "초5-2", "2025-03", 40.0)];
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-03"), 0.0);
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-02"), 0.0);
    }

    #[test]
    fn uses_latest_prior_month() {
        let records = vec![
            record("A", "초5-2", "2025-01", 30.0),
            record("A", "초5-2", "2025-02", 55.0),
        ];
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-03"), 55.0);
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-02"), 30.0);
    }

    #[test]
    fn same_month_resolves_by_maximum() {
        let records = vec![
            record("A", "초5-2", "2025-02", 40.0),
            record("A", "초5-2", "2025-02", 60.0),
            record("A", "초5-2", "2025-02", 50.0),
        ];
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-03"), 60.0);
    }

    #[test]
    fn other_students_and_terms_are_ignored() {
        let records = vec![
            record("B", "초5-2", "2025-02", 80.0),
            record("A", "초6-1", "2025-02", 70.0),
            record("A", "초5-2", "2025-01", 20.0),
        ];
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-03"), 20.0);
    }

    #[test]
    fn later_months_do_not_count() {
        let records = vec![
            record("A", "초5-2", "2025-01", 10.0),
            record("A", "초5-2", "2025-05", 90.0),
        ];
        assert_eq!(previous_progress(&records, "A", "초5-2", "2025-03"), 10.0);
    }

    #[test]
    fn max_progress_of_empty_is_zero() {
        assert_eq!(max_progress(std::iter::empty()), 0.0);
        let records = vec![record("A", "", "2025-01", 12.5), record("A", "", "2025-01", 7.0)];
        assert_eq!(max_progress(&records), 12.5);
    }
}
