//! Login and grade-sheet lock state as plain values with pure transitions.
//!
//! The shared secret is compared by plain string equality. It is an access
//! gate against accidental edits, not authentication.

use crate::error::{GradebookError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Parameters,
    Students,
    Grading,
    Report,
}

impl Page {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parameters" => Some(Self::Parameters),
            "students" => Some(Self::Students),
            "grading" => Some(Self::Grading),
            "report" => Some(Self::Report),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub logged_in: bool,
    pub locked: bool,
    pub page: Page,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            logged_in: false,
            locked: true,
            page: Page::Parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Verified,
    SecretCreated,
}

pub fn login(
    session: Session,
    secret: Option<&str>,
    credential: &str,
    lock_on_login: bool,
) -> Result<(Session, LoginOutcome)> {
    if credential.is_empty() {
        return Err(GradebookError::Validation(
            "Please enter a password".to_string(),
        ));
    }
    let outcome = match secret {
        None => LoginOutcome::SecretCreated,
        Some(s) if s == credential => LoginOutcome::Verified,
        Some(_) => return Err(GradebookError::Auth),
    };
    let next = Session {
        logged_in: true,
        locked: session.locked || lock_on_login,
        page: session.page,
    };
    Ok((next, outcome))
}

pub fn logout(session: Session) -> Session {
    Session {
        logged_in: false,
        locked: session.locked,
        page: Page::Parameters,
    }
}

pub fn lock(session: Session) -> Session {
    Session {
        locked: true,
        ..session
    }
}

pub fn unlock(session: Session, secret: Option<&str>, credential: &str) -> Result<Session> {
    match secret {
        Some(s) if s == credential => Ok(Session {
            locked: false,
            ..session
        }),
        _ => Err(GradebookError::Auth),
    }
}

pub fn navigate(session: Session, page: Page) -> Session {
    Session { page, ..session }
}

pub fn ensure_logged_in(session: &Session) -> Result<()> {
    if !session.logged_in {
        return Err(GradebookError::NotLoggedIn);
    }
    Ok(())
}

/// Score edits need a logged-in session and an unlocked sheet.
pub fn ensure_can_edit_scores(session: &Session) -> Result<()> {
    ensure_logged_in(session)?;
    if session.locked {
        return Err(GradebookError::Locked);
    }
    Ok(())
}
