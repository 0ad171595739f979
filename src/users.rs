use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// Account role. `admin` in the credential file is an administrator,
/// any other value an instructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Instructor,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value.trim() == "admin" {
            Role::Admin
        } else {
            Role::Instructor
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A row of the credential file. Passwords are kept in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "이름")]
    pub name: String,

    #[serde(rename = "역할")]
    pub role: Role,

    #[serde(rename = "비밀번호")]
    pub password: String,
}

/// Accounts loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<UserAccount>,
    missing_file: Option<PathBuf>,
}

impl UserStore {
    /// Load the credential file
    ///
    /// A missing file is not an error: the store comes back empty, remembers
    /// the path for the login page to report, and every login fails.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::error!("credential file {} not found", path.display());
            return Ok(Self {
                users: Vec::new(),
                missing_file: Some(path.to_path_buf()),
            });
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut users = Vec::new();
        for result in reader.deserialize::<UserAccount>() {
            users.push(result?);
        }
        log::info!("loaded {} accounts from {}", users.len(), path.display());

        Ok(Self {
            users,
            missing_file: None,
        })
    }

    pub fn from_accounts(users: Vec<UserAccount>) -> Self {
        Self {
            users,
            missing_file: None,
        }
    }

    /// Plaintext comparison of ID and password
    pub fn authenticate(&self, id: &str, password: &str) -> Option<&UserAccount> {
        self.users
            .iter()
            .find(|user| user.id == id && user.password == password)
    }

    pub fn find(&self, id: &str) -> Option<&UserAccount> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn missing_file(&self) -> Option<&Path> {
        self.missing_file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
