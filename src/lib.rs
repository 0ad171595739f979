/*!
# PrepStory scores & progress

Record keeping for an academy: instructors log in, enter each student's
monthly quiz results and unit progress, and look at a progress report that
compares last month with this month.

## Architecture

### Core
- **Term Extractor** - derives the academic term (`초5-2`) from a unit name
- **Progress Lookup** - finds how far a student had got in a term before a month
- **Report assembly** - picks the rows, term and progress values for one student and month

### Storage
- Score records in a flat CSV file, rewritten in full on every save
- Accounts in a CSV credential file, loaded once at startup

### Web shell (feature `web`)
- **Technologies**: axum, handlebars, plotters
- Login with an in-memory session per browser
- Entry form, report view with a two-segment progress bar, and an
  administrator-only data page with CSV/XLSX export and bulk delete

## Modules

- **term**: unit name to term label
- **progress**: previous-month progress lookup
- **record**: score record row, entry form and accuracy
- **store**: CSV record store
- **users**: credential file and roles
- **report**: report view model
- **config**: environment driven settings
- **error**: shared error type
- **graph**: progress bar rendering
- **downloader**: XLSX export
- **login**: sessions and authentication middleware
- **pages**: handlebars templates
- **app**: routing

## Routes

- `/login`, `/logout` - authentication
- `/entry` - entry form and the user's own rows
- `/report`, `/report/chart.png` - progress report
- `/admin`, `/admin/export.csv`, `/admin/export.xlsx`, `/admin/delete` - administrator data management
*/

pub mod config;
pub mod error;
pub mod progress;
pub mod record;
pub mod report;
pub mod store;
pub mod term;
pub mod users;

#[cfg(feature = "web")]
pub mod app;
pub mod downloader;
pub mod graph;
pub mod login;
pub mod pages;

pub use error::{AppError, AppResult};
pub use progress::previous_progress;
pub use record::{ScoreEntry, ScoreRecord, accuracy};
pub use store::RecordStore;
pub use term::extract_term;
pub use users::{Role, UserAccount, UserStore};
