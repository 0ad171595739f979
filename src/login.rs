#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use axum::{
    Form,
    extract::{Query, Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use lazy_static::lazy_static;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppResult;
use crate::users::UserAccount;

pub const SESSION_COOKIE: &str = "session";
const SESSION_DURATION: u64 = 12 * 60 * 60; // 12 hours in seconds

/// A logged-in marker for one browser
#[derive(Debug, Clone)]
pub struct Session {
    /// ID of the authenticated account
    pub user_id: String,

    pub expires_at: SystemTime,
}

lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, Session>> = RwLock::new(HashMap::new());
}

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Create a session for an authenticated account and return its ID
pub fn create_session(user_id: &str) -> String {
    let session_id = Uuid::new_v4().to_string();
    let session = Session {
        user_id: user_id.to_string(),
        expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
    };

    let mut sessions = SESSIONS.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    sessions.insert(session_id.clone(), session);

    session_id
}

/// The account ID behind a session, if it exists and has not expired
pub fn validate_session(session_id: &str) -> Option<String> {
    let sessions = SESSIONS.read().unwrap_or_else(|poisoned| poisoned.into_inner());

    sessions
        .get(session_id)
        .filter(|session| session.expires_at > SystemTime::now())
        .map(|session| session.user_id.clone())
}

pub fn end_session(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    sessions.remove(session_id);
}

/// Resolve the account of the request's session cookie
pub fn current_user(state: &AppState, jar: &CookieJar) -> Option<UserAccount> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let user_id = validate_session(cookie.value())?;
    state.users.find(&user_id).cloned()
}

fn session_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie
}

pub async fn serve_login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> AppResult<Html<String>> {
    let missing_file = state
        .users
        .missing_file()
        .map(|path| path.display().to_string());

    state.pages.render(
        "login",
        &json!({
            "missing_file": missing_file,
            "error": query.error,
        }),
    )
}

/// Plaintext credential check; no lockout, the user may simply retry
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.users.authenticate(&form.id, &form.password) {
        Some(user) => {
            log::info!("{} ({}) logged in", user.id, user.role.as_str());
            let session_id = create_session(&user.id);
            (jar.add(session_cookie(session_id)), Redirect::to("/entry")).into_response()
        }
        None => {
            log::warn!("failed login for {:?}", form.id);
            let target = format!(
                "/login?error={}",
                urlencoding::encode("Invalid ID or password")
            );
            Redirect::to(&target).into_response()
        }
    }
}

pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        end_session(cookie.value());
    }

    (jar.remove(session_cookie(String::new())), Redirect::to("/login"))
}

/// Authentication middleware
///
/// Puts the logged-in `UserAccount` into the request extensions, or
/// redirects to the login page.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &jar) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Administrator-only routes; instructors are sent back to the entry page
pub async fn require_admin(request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<UserAccount>()
        .is_some_and(|user| user.role.is_admin());

    if is_admin {
        next.run(request).await
    } else {
        Redirect::to("/entry").into_response()
    }
}
