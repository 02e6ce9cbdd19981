use super::planner::PlanReport;
use thiserror::Error;

/// Options d'une passe de planification.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Calcule le même bilan sans rien écrire.
    pub dry_run: bool,
}

impl PlanOptions {
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid time window: end must be strictly after start")]
    InvalidTimeWindow,
    #[error("invalid date range: end must not precede start")]
    InvalidDateRange,
    #[error("unknown client: {0}")]
    UnknownClient(String),
    #[error("unknown caregiver: {0}")]
    UnknownCaregiver(String),
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error("shift no longer open: {0}")]
    ShiftNotOpen(String),
    #[error("claim rejected: {0}")]
    ClaimRejected(&'static str),
    /// Interruption en cours de passe : le bilan partiel distingue les
    /// vacations validées de celles jamais tentées.
    #[error("planning aborted after {attempted} of {total} shift(s): {reason}")]
    RunAborted {
        attempted: usize,
        total: usize,
        reason: String,
        report: Box<PlanReport>,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
