//! One "selected move → learners → records" attempt
//!
//! A session runs off the UI thread and reports a [`SessionOutcome`]. It
//! never touches display state itself; the coordinator decides whether the
//! outcome is still wanted.

use crate::client::{ApiError, MoveApi, Pokemon};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::instrument;

/// Dependent records fetched per move
pub const DEPENDENT_LIMIT: usize = 20;

pub const NOT_FOUND_MESSAGE: &str = "Move not found";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Revocable flag shared between a session and whoever started it
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), Abort> {
        if self.is_cancelled() {
            Err(Abort::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Success,
    Cancelled,
    Failed,
}

/// User-facing session failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    NotFound(String),

    #[error("No Pokémon can learn this move")]
    NoDependents,

    #[error("{0}")]
    Network(String),
}

impl SessionError {
    /// Network failure with the generic fallback when no message is available
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            SessionError::Network(GENERIC_ERROR_MESSAGE.to_string())
        } else {
            SessionError::Network(message)
        }
    }

    fn from_move_error(err: ApiError) -> Self {
        match err {
            ApiError::Status { .. } | ApiError::Parse { .. } => {
                SessionError::NotFound(NOT_FOUND_MESSAGE.to_string())
            }
            other => SessionError::network(other.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum SessionOutcome {
    Success(Vec<Pokemon>),
    Cancelled,
    Failed(SessionError),
}

impl SessionOutcome {
    pub fn state(&self) -> SessionState {
        match self {
            SessionOutcome::Success(_) => SessionState::Success,
            SessionOutcome::Cancelled => SessionState::Cancelled,
            SessionOutcome::Failed(_) => SessionState::Failed,
        }
    }
}

enum Abort {
    Cancelled,
    Failed(SessionError),
}

impl From<SessionError> for Abort {
    fn from(err: SessionError) -> Self {
        Abort::Failed(err)
    }
}

/// Fetch the move, then its first [`DEPENDENT_LIMIT`] learners in parallel.
///
/// All-or-nothing: one failed learner fails the session. A cancelled token
/// always yields `Cancelled`, even if a fetch also failed.
#[instrument(name = "session", skip_all, fields(name = %name))]
pub fn run_session(api: &dyn MoveApi, name: &str, token: &CancelToken) -> SessionOutcome {
    let result = fetch_learners(api, name, token);

    if token.is_cancelled() {
        return SessionOutcome::Cancelled;
    }

    match result {
        Ok(records) => SessionOutcome::Success(records),
        Err(Abort::Cancelled) => SessionOutcome::Cancelled,
        Err(Abort::Failed(err)) => SessionOutcome::Failed(err),
    }
}

fn fetch_learners(
    api: &dyn MoveApi,
    name: &str,
    token: &CancelToken,
) -> Result<Vec<Pokemon>, Abort> {
    token.check()?;
    let detail = api
        .move_detail(&name.to_lowercase())
        .map_err(SessionError::from_move_error)?;
    token.check()?;

    if detail.learned_by_pokemon.is_empty() {
        return Err(SessionError::NoDependents.into());
    }

    let count = detail.learned_by_pokemon.len().min(DEPENDENT_LIMIT);
    let learners = &detail.learned_by_pokemon[..count];
    log::debug!("Fetching {} learners of {}", learners.len(), name);

    learners
        .par_iter()
        .map(|learner| -> Result<Pokemon, Abort> {
            token.check()?;
            let record = api.pokemon(&learner.url).map_err(|e| {
                log::warn!("Failed to fetch {}: {}", learner.url, e);
                SessionError::network(e.to_string())
            })?;
            token.check()?;
            Ok(record)
        })
        .collect()
}
