use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("{0}")]
    Validation(String),

    #[error("Student ID already exists: {0}")]
    DuplicateId(String),

    #[error("Incorrect password")]
    Auth,

    #[error("log in first")]
    NotLoggedIn,

    #[error("grades are locked")]
    Locked,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl GradebookError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::DuplicateId(_) => "duplicate_id",
            Self::Auth => "auth_failed",
            Self::NotLoggedIn => "not_logged_in",
            Self::Locked => "grades_locked",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "db_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, GradebookError>;
