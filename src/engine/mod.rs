mod claim;
mod conflicts;
mod coverage;
mod occurrence;
mod planner;
mod scoring;
mod types;

pub use conflicts::Conflict;
pub use coverage::{CaregiverUtilization, ClientCoverage, CoverageReport, CoverageSummary};
pub use occurrence::{
    caregiver_week_hours, client_week_hours, find_conflict, occurs_on, week_start, windows_overlap,
};
pub use planner::{
    Disqualification, PlanReport, RejectedCandidate, ShiftOutcome, ShiftResolution,
};
pub use scoring::Suggestion;
pub use types::{EngineError, PlanOptions};

use crate::audit::AuditEvent;
use crate::model::{
    CaregiverId, Client, Caregiver, ClientId, Directory, OpenShift, ScheduleId, ShiftId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Engine : encapsule l'annuaire et expose les opérations du moteur.
///
/// Trois opérations cœur — classement consultatif, remplissage automatique,
/// couverture hebdomadaire — plus la revendication directe et le contrôle de
/// cohérence. L'appelant fournit les horodatages : le moteur ne lit jamais
/// l'horloge.
#[derive(Debug, Default)]
pub struct Engine {
    directory: Directory,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            directory: Directory::default(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }
    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    pub fn add_caregivers(&mut self, caregivers: Vec<Caregiver>) {
        self.directory.caregivers.extend(caregivers);
    }

    pub fn add_clients(&mut self, clients: Vec<Client>) {
        self.directory.clients.extend(clients);
    }

    /// Publie une vacation ouverte après validation.
    pub fn post_shift(
        &mut self,
        client: &ClientId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        urgency: i32,
    ) -> Result<ShiftId, EngineError> {
        if end <= start {
            return Err(EngineError::InvalidTimeWindow);
        }
        if self.directory.find_client(client).is_none() {
            return Err(EngineError::UnknownClient(client.as_str().to_string()));
        }
        let shift = OpenShift::new(client.clone(), date, start, end, urgency)
            .map_err(|_| EngineError::InvalidTimeWindow)?;
        let id = shift.id.clone();
        self.directory.open_shifts.push(shift);
        Ok(id)
    }

    /// Classement consultatif du vivier pour un créneau. Lecture seule.
    pub fn suggest_caregivers(
        &self,
        client: &ClientId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<Suggestion>, EngineError> {
        scoring::suggest_caregivers(&self.directory, client, date, start, end)
    }

    /// Remplissage glouton des vacations ouvertes de la plage.
    pub fn auto_fill(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        opts: PlanOptions,
        now: DateTime<Utc>,
    ) -> Result<PlanReport, EngineError> {
        planner::auto_fill(&mut self.directory, start_date, end_date, opts, now)
    }

    /// Instantané de couverture pour la semaine contenant `week_of`.
    /// Lecture seule.
    pub fn coverage_overview(&self, week_of: NaiveDate) -> CoverageReport {
        coverage::coverage_overview(&self.directory, week_of)
    }

    /// Revendication directe d'une vacation encore ouverte.
    pub fn claim_shift(
        &mut self,
        shift: &ShiftId,
        caregiver: &CaregiverId,
        now: DateTime<Utc>,
    ) -> Result<(ScheduleId, AuditEvent), EngineError> {
        claim::claim_shift(&mut self.directory, shift, caregiver, now)
    }

    /// Contrôle de cohérence sur la semaine contenant `week_of`.
    pub fn detect_conflicts(&self, week_of: NaiveDate) -> Vec<Conflict> {
        conflicts::detect_conflicts(&self.directory, week_of)
    }
}
