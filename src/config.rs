use std::path::{Path, PathBuf};

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_USERS_FILE: &str = "users.csv";
const DEFAULT_DATA_FILE: &str = "prepstory_scores.csv";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_CHART_WIDTH: u32 = 900;
const DEFAULT_CHART_HEIGHT: u32 = 150;

/// Runtime settings, read from `PREPSTORY_*` environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub users_file: PathBuf,
    pub data_file: PathBuf,
    pub static_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    ///
    /// Call [`load_dotenv`] first so values from `.env` are visible here.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            bind_addr: text("PREPSTORY_BIND").unwrap_or(defaults.bind_addr),
            users_file: text("PREPSTORY_USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.users_file),
            data_file: text("PREPSTORY_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            static_dir: text("PREPSTORY_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            chart_width: parse_dimension(
                "PREPSTORY_CHART_WIDTH",
                text("PREPSTORY_CHART_WIDTH"),
                defaults.chart_width,
            ),
            chart_height: parse_dimension(
                "PREPSTORY_CHART_HEIGHT",
                text("PREPSTORY_CHART_HEIGHT"),
                defaults.chart_height,
            ),
        }
    }
}

/// Apply `.env` from the working directory or one of its parents
///
/// Runs before the logger exists so that `RUST_LOG` can come from the file.
/// Variables already set in the process win over the file.
///
/// # Returns
/// * The path of the file that was applied, or `None` when there is none
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Apply a specific env file, returning whether it could be read
pub fn load_dotenv_from(path: &Path) -> bool {
    dotenvy::from_path(path).is_ok()
}

fn parse_dimension(key: &str, value: Option<String>, default: u32) -> u32 {
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => parsed,
        _ => {
            log::warn!("ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }
    }
}
