use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::term::extract_term;

/// Column headers of the score record file, in file order
pub const RECORD_HEADERS: [&str; 14] = [
    "학생명",
    "학년",
    "반",
    "월",
    "단원명",
    "학기",
    "전체문항",
    "맞은문항",
    "정답률",
    "단원평가",
    "진도진행률",
    "코멘트",
    "작성자_ID",
    "작성시각",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One monthly entry for a student and unit
///
/// Rows are only ever appended; duplicates for the same student and month
/// are allowed and accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "학생명")]
    pub student: String,

    #[serde(rename = "학년")]
    pub grade: String,

    #[serde(rename = "반")]
    pub class: String,

    /// `YYYY-MM`
    #[serde(rename = "월")]
    pub month: String,

    #[serde(rename = "단원명")]
    pub unit: String,

    /// Derived from `unit` when the record was written
    #[serde(rename = "학기")]
    pub term: String,

    #[serde(rename = "전체문항")]
    pub total_questions: u32,

    #[serde(rename = "맞은문항")]
    pub correct_questions: u32,

    #[serde(rename = "정답률")]
    pub accuracy: f64,

    #[serde(rename = "단원평가")]
    pub unit_score: f64,

    #[serde(rename = "진도진행률")]
    pub progress: f64,

    #[serde(rename = "코멘트")]
    pub comment: String,

    #[serde(rename = "작성자_ID")]
    pub author_id: String,

    #[serde(rename = "작성시각")]
    pub written_at: String,
}

/// The entry form as submitted by an instructor
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEntry {
    pub student: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub class: String,
    pub month: String,
    pub unit: String,
    pub total_questions: u32,
    pub correct_questions: u32,
    pub unit_score: f64,
    pub progress: f64,
    #[serde(default)]
    pub comment: String,
}

impl ScoreEntry {
    /// Range checks matching the limits of the entry form
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=100).contains(&self.total_questions) {
            return Err(AppError::Validation(
                "Total questions must be between 1 and 100".to_string(),
            ));
        }
        if self.correct_questions > 100 {
            return Err(AppError::Validation(
                "Correct questions must be between 0 and 100".to_string(),
            ));
        }
        if !is_percentage(self.unit_score) {
            return Err(AppError::Validation(
                "Unit test score must be between 0 and 100".to_string(),
            ));
        }
        if !is_percentage(self.progress) {
            return Err(AppError::Validation(
                "Progress must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the stored row, deriving accuracy and term
    pub fn into_record(self, author_id: &str, written_at: NaiveDateTime) -> ScoreRecord {
        let accuracy = accuracy(self.correct_questions, self.total_questions);
        let term = extract_term(&self.unit);

        ScoreRecord {
            student: self.student,
            grade: self.grade,
            class: self.class,
            month: self.month,
            unit: self.unit,
            term,
            total_questions: self.total_questions,
            correct_questions: self.correct_questions,
            accuracy,
            unit_score: self.unit_score,
            progress: self.progress,
            comment: self.comment,
            author_id: author_id.to_string(),
            written_at: written_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Percentage of correct answers, rounded to one decimal with ties to even
///
/// A zero total never reaches here through the form; it maps to 0.0 rather
/// than writing NaN into the record file.
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = correct as f64 / total as f64 * 100.0;
    (percent * 10.0).round_ties_even() / 10.0
}

fn is_percentage(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry() -> ScoreEntry {
        ScoreEntry {
            student: "김민지".to_string(),
            grade: "5".to_string(),
            class: "A".to_string(),
            month: "2025-10".to_string(),
            unit: "초5-2 분수의 곱셈".to_string(),
            total_questions: 20,
            correct_questions: 18,
            unit_score: 95.5,
            progress: 40.0,
            comment: "good, keep going".to_string(),
        }
    }

    #[test]
    fn accuracy_rounds_to_one_decimal() {
        assert_eq!(accuracy(18, 20), 90.0);
        assert_eq!(accuracy(1, 3), 33.3);
        assert_eq!(accuracy(2, 3), 66.7);
        assert_eq!(accuracy(20, 20), 100.0);
        assert_eq!(accuracy(0, 7), 0.0);
        // exact ties go to the even digit
        assert_eq!(accuracy(1, 16), 6.2);
        assert_eq!(accuracy(9, 16), 56.2);
        assert_eq!(accuracy(3, 16), 18.8);
        assert_eq!(accuracy(1, 8), 12.5);
    }

    #[test]
    fn zero_total_does_not_produce_nan() {
        assert_eq!(accuracy(5, 0), 0.0);
    }

    #[test]
    fn record_derives_term_and_accuracy() {
        let written_at = NaiveDate::from_ymd_opt(2025, 10, 3)
            .unwrap()
            .and_hms_micro_opt(14, 5, 9, 120)
            .unwrap();
        let record = entry().into_record("t01", written_at);

        assert_eq!(record.term, "초5-2");
        assert_eq!(record.accuracy, 90.0);
        assert_eq!(record.author_id, "t01");
        assert_eq!(record.written_at, "2025-10-03T14:05:09.000120");
        assert_eq!(record.comment, "good, keep going");
    }

    #[test]
    fn validation_enforces_numeric_ranges() {
        assert!(entry().validate().is_ok());

        let mut bad = entry();
        bad.total_questions = 0;
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));

        let mut bad = entry();
        bad.correct_questions = 101;
        assert!(bad.validate().is_err());

        let mut bad = entry();
        bad.progress = 100.5;
        assert!(bad.validate().is_err());

        let mut bad = entry();
        bad.unit_score = -1.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn correct_may_exceed_total() {
        let mut odd = entry();
        odd.correct_questions = 25;
        assert!(odd.validate().is_ok());
    }
}
