#![cfg(feature = "web")]

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::record::ScoreRecord;
use crate::users::UserAccount;

const TEMPLATES: [(&str, &str); 4] = [
    ("login", include_str!("./templates/login.hbs")),
    ("entry", include_str!("./templates/entry.hbs")),
    ("report", include_str!("./templates/report.hbs")),
    ("admin", include_str!("./templates/admin.hbs")),
];

const PARTIALS: [(&str, &str); 2] = [
    ("header", include_str!("./templates/header.hbs")),
    ("records_table", include_str!("./templates/records_table.hbs")),
];

/// Handlebars registry holding every page of the shell
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();

        for (name, source) in PARTIALS {
            registry
                .register_partial(name, source)
                .map_err(template_error)?;
        }
        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, source)
                .map_err(template_error)?;
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> AppResult<Html<String>> {
        self.registry
            .render(name, data)
            .map(Html)
            .map_err(template_error)
    }
}

/// A record as shown in the data tables
#[derive(Debug, Serialize)]
pub struct RecordRow<'a> {
    pub student: &'a str,
    pub grade: &'a str,
    pub class: &'a str,
    pub month: &'a str,
    pub unit: &'a str,
    pub term: &'a str,
    pub total_questions: u32,
    pub correct_questions: u32,
    pub accuracy: f64,
    pub unit_score: f64,
    pub progress: f64,
    pub comment: &'a str,
    pub author_id: &'a str,
    pub written_at: &'a str,
}

impl<'a> From<&'a ScoreRecord> for RecordRow<'a> {
    fn from(record: &'a ScoreRecord) -> Self {
        Self {
            student: &record.student,
            grade: &record.grade,
            class: &record.class,
            month: &record.month,
            unit: &record.unit,
            term: &record.term,
            total_questions: record.total_questions,
            correct_questions: record.correct_questions,
            accuracy: record.accuracy,
            unit_score: record.unit_score,
            progress: record.progress,
            comment: &record.comment,
            author_id: &record.author_id,
            written_at: &record.written_at,
        }
    }
}

pub fn record_rows<'a>(records: impl IntoIterator<Item = &'a ScoreRecord>) -> Vec<RecordRow<'a>> {
    records.into_iter().map(RecordRow::from).collect()
}

/// Header and menu data shared by every logged-in page
pub fn nav(user: &UserAccount, active: &str) -> Value {
    json!({
        "name": user.name,
        "role": user.role.as_str(),
        "is_admin": user.role.is_admin(),
        "entry": active == "entry",
        "report": active == "report",
        "admin": active == "admin",
    })
}

fn template_error(err: impl std::fmt::Display) -> AppError {
    AppError::Template(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::Role;

    #[test]
    fn all_templates_register() {
        assert!(Pages::new().is_ok());
    }

    #[test]
    fn login_page_reports_missing_credentials() {
        let pages = Pages::new().unwrap();
        let html = pages
            .render(
                "login",
                &json!({ "missing_file": "users.csv", "error": null }),
            )
            .unwrap();
        assert!(html.0.contains("users.csv"));
    }

    #[test]
    fn admin_menu_only_for_admins() {
        let pages = Pages::new().unwrap();
        let instructor = UserAccount {
            id: "t01".to_string(),
            name: "김선생".to_string(),
            role: Role::Instructor,
            password: "pw".to_string(),
        };
        let data = json!({
            "nav": nav(&instructor, "entry"),
            "rows": [],
            "defaults": { "month": "2025-10" },
        });
        let html = pages.render("entry", &data).unwrap().0;
        assert!(html.contains("김선생"));
        assert!(!html.contains("href=\"/admin\""));

        let admin = UserAccount {
            role: Role::Admin,
            ..instructor
        };
        let data = json!({ "nav": nav(&admin, "entry"), "rows": [], "defaults": {} });
        let html = pages.render("entry", &data).unwrap().0;
        assert!(html.contains("href=\"/admin\""));
    }

    #[test]
    fn month_field_is_free_text() {
        let pages = Pages::new().unwrap();
        let admin = UserAccount {
            id: "boss".to_string(),
            name: "원장님".to_string(),
            role: Role::Admin,
            password: "pw".to_string(),
        };
        let data = json!({ "nav": nav(&admin, "entry"), "rows": [], "defaults": { "month": "2025-10" } });
        let html = pages.render("entry", &data).unwrap().0;
        assert!(html.contains("name=\"month\""));
        assert!(!html.contains("pattern="));
    }
}
