use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::Settings;
use crate::downloader;
use crate::error::{AppError, AppResult};
use crate::graph::{self, ChartOptions};
use crate::login;
use crate::pages::{Pages, nav, record_rows};
use crate::record::{ScoreEntry, ScoreRecord};
use crate::report::{build_report, visible_records};
use crate::store::RecordStore;
use crate::users::{UserAccount, UserStore};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared state of the web shell
///
/// Accounts are loaded once at startup. The record store sits behind a mutex
/// so one read-append-rewrite finishes before the next begins.
pub struct AppState {
    pub settings: Settings,
    pub users: UserStore,
    pub store: Mutex<RecordStore>,
    pub pages: Pages,
    pub chart: ChartOptions,
}

impl AppState {
    pub fn new(settings: Settings) -> AppResult<Self> {
        let users = UserStore::load(&settings.users_file)?;
        let store = RecordStore::new(settings.data_file.clone());
        store.ensure_file()?;
        let chart = ChartOptions {
            width: settings.chart_width,
            height: settings.chart_height,
        };

        Ok(Self {
            settings,
            users,
            store: Mutex::new(store),
            pages: Pages::new()?,
            chart,
        })
    }

    fn with_store<T>(&self, f: impl FnOnce(&RecordStore) -> AppResult<T>) -> AppResult<T> {
        let store = self.store.lock().map_err(|_| AppError::StorePoisoned)?;
        f(&store)
    }

    fn load_records(&self) -> AppResult<Vec<ScoreRecord>> {
        self.with_store(|store| store.load())
    }

    fn export_file_name(&self, extension: &str) -> String {
        self.settings
            .data_file
            .with_extension(extension)
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("prepstory_scores.{extension}"))
    }
}

#[derive(Debug, Default, Deserialize)]
struct EntryQuery {
    saved: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportQuery {
    student: Option<String>,
    month: Option<String>,
}

/// Build the router with every menu action
pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/export.csv", get(export_csv))
        .route("/admin/export.xlsx", get(export_xlsx))
        .route("/admin/delete", post(delete_all))
        .route_layer(middleware::from_fn(login::require_admin));

    let protected = Router::new()
        .route("/entry", get(entry_page).post(submit_entry))
        .route("/report", get(report_page))
        .route("/report/chart.png", get(report_chart))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login::require_auth,
        ));

    Router::new()
        .route("/", get(index))
        .route(
            "/login",
            get(login::serve_login_page).post(login::handle_login),
        )
        .route("/logout", get(login::handle_logout))
        .merge(protected)
        .nest_service("/static", ServeDir::new(&state.settings.static_dir))
        .with_state(state)
}

pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(settings)?);
    let bind_addr = state.settings.bind_addr.clone();
    let app = router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Redirect {
    match login::current_user(&state, &jar) {
        Some(_) => Redirect::to("/entry"),
        None => Redirect::to("/login"),
    }
}

async fn entry_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
    Query(query): Query<EntryQuery>,
) -> AppResult<Html<String>> {
    let records = state.load_records()?;
    let visible = visible_records(&records, &user);

    state.pages.render(
        "entry",
        &json!({
            "nav": nav(&user, "entry"),
            "saved": query.saved.is_some(),
            "defaults": {
                "month": Local::now().format("%Y-%m").to_string(),
                "total_questions": 20,
                "correct_questions": 20,
                "unit_score": 100.0,
                "progress": 0.0,
            },
            "rows": record_rows(visible),
        }),
    )
}

async fn submit_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
    Form(entry): Form<ScoreEntry>,
) -> AppResult<Redirect> {
    entry.validate()?;

    let student = entry.student.clone();
    let record = entry.into_record(&user.id, Local::now().naive_local());
    let records = state.with_store(|store| store.append(record))?;
    log::info!(
        "{} saved an entry for {} ({} records)",
        user.id,
        student,
        records.len()
    );

    Ok(Redirect::to("/entry?saved=1"))
}

async fn report_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Html<String>> {
    let records = state.load_records()?;
    let report = build_report(
        &records,
        &user,
        query.student.as_deref(),
        query.month.as_deref(),
    );

    let Some(report) = report else {
        return state.pages.render(
            "report",
            &json!({ "nav": nav(&user, "report"), "no_data": true }),
        );
    };

    let students: Vec<_> = report
        .students
        .iter()
        .map(|name| json!({ "name": name, "selected": *name == report.student }))
        .collect();
    let months: Vec<_> = report
        .months
        .iter()
        .map(|name| json!({ "name": name, "selected": *name == report.month }))
        .collect();
    let chart_url = format!(
        "/report/chart.png?student={}&month={}",
        urlencoding::encode(&report.student),
        urlencoding::encode(&report.month)
    );

    state.pages.render(
        "report",
        &json!({
            "nav": nav(&user, "report"),
            "no_data": false,
            "students": students,
            "months": months,
            "rows": record_rows(&report.rows),
            "term": report.term,
            "caption": report.caption(),
            "chart_url": chart_url,
        }),
    )
}

async fn report_chart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let records = state.load_records()?;
    let report = build_report(
        &records,
        &user,
        query.student.as_deref(),
        query.month.as_deref(),
    );

    let Some(report) = report else {
        return Ok((StatusCode::NOT_FOUND, "No data.").into_response());
    };

    let png = graph::render_progress_bar(&report.term, report.previous, report.current, &state.chart)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn admin_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
) -> AppResult<Html<String>> {
    let records = state.load_records()?;

    state.pages.render(
        "admin",
        &json!({
            "nav": nav(&user, "admin"),
            "rows": record_rows(&records),
        }),
    )
}

/// The record file as stored, byte for byte
async fn export_csv(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
) -> AppResult<Response> {
    let bytes = state.with_store(|store| store.raw_bytes())?;
    log::info!("{} exported the record file ({} bytes)", user.id, bytes.len());

    Ok(attachment("text/csv; charset=utf-8", &state.export_file_name("csv"), bytes))
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
) -> AppResult<Response> {
    let records = state.load_records()?;
    let bytes = downloader::to_xlsx(&records)?;
    log::info!("{} exported {} records as xlsx", user.id, records.len());

    Ok(attachment(XLSX_CONTENT_TYPE, &state.export_file_name("xlsx"), bytes))
}

/// Irreversibly remove the record file
async fn delete_all(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserAccount>,
) -> AppResult<Redirect> {
    state.with_store(|store| store.delete_all())?;
    log::warn!("{} deleted all score records", user.id);

    Ok(Redirect::to("/admin"))
}

fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}
