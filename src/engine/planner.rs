use super::occurrence::{caregiver_week_hours, find_conflict, week_start, windows_overlap};
use super::scoring::assignment_score;
use super::types::{EngineError, PlanOptions};
use crate::audit::{AuditAction, AuditEvent};
use crate::geo;
use crate::model::{
    CaregiverId, ClientId, Directory, OpenShift, Schedule, ShiftId, ShiftStatus,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Candidats écartés rapportés par vacation non pourvue.
const REPORTED_CANDIDATES: usize = 3;

/// Raison d'inéligibilité d'un candidat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disqualification {
    Conflict,
    ExceedsHours,
    MissingCerts { certs: Vec<String> },
}

/// Candidat écarté, avec sa raison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    pub caregiver: CaregiverId,
    pub reason: Disqualification,
}

/// Issue d'une vacation traitée par la passe gloutonne.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftResolution {
    Assigned {
        caregiver: CaregiverId,
        score: i32,
        distance_miles: Option<f64>,
        familiarity: u32,
    },
    Unfilled {
        candidates: Vec<RejectedCandidate>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftOutcome {
    pub shift: ShiftId,
    pub client: ClientId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub resolution: ShiftResolution,
}

/// Bilan d'une passe de planification.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PlanReport {
    pub filled: usize,
    pub failed: usize,
    pub total: usize,
    pub results: Vec<ShiftOutcome>,
    /// Une trace par écriture réalisée ; vide en répétition à blanc.
    pub events: Vec<AuditEvent>,
}

/// État propre à une passe : photographie des heures engagées au départ,
/// puis heures et créneaux ajoutés pendant la passe elle-même. Sans lui,
/// deux vacations du même lot pourraient doubler la réservation d'un
/// intervenant — et en passe réelle, relire l'annuaire compterait deux fois
/// les plannings fraîchement insérés.
#[derive(Debug, Default)]
struct RunState {
    baseline_hours: HashMap<(CaregiverId, NaiveDate), f64>,
    added_hours: HashMap<(CaregiverId, NaiveDate), f64>,
    commitments: HashMap<CaregiverId, Vec<(NaiveDate, NaiveTime, NaiveTime)>>,
}

impl RunState {
    /// Photographie les heures hebdomadaires de tout le vivier, pour chaque
    /// semaine touchée par le lot, avant la première écriture.
    fn snapshot(dir: &Directory, batch: &[OpenShift]) -> Self {
        let mut weeks: Vec<NaiveDate> = batch.iter().map(|s| week_start(s.date)).collect();
        weeks.sort();
        weeks.dedup();

        let mut baseline_hours = HashMap::new();
        for caregiver in &dir.caregivers {
            for &week in &weeks {
                baseline_hours.insert(
                    (caregiver.id.clone(), week),
                    caregiver_week_hours(dir, &caregiver.id, week),
                );
            }
        }
        Self {
            baseline_hours,
            added_hours: HashMap::new(),
            commitments: HashMap::new(),
        }
    }

    fn running_hours(&self, caregiver: &CaregiverId, week: NaiveDate) -> f64 {
        let key = (caregiver.clone(), week);
        self.baseline_hours.get(&key).copied().unwrap_or(0.0)
            + self.added_hours.get(&key).copied().unwrap_or(0.0)
    }

    fn conflicts_with(
        &self,
        caregiver: &CaregiverId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> bool {
        self.commitments
            .get(caregiver)
            .map_or(false, |windows| {
                windows
                    .iter()
                    .any(|(d, s, e)| *d == date && windows_overlap(*s, *e, start, end))
            })
    }

    fn commit(
        &mut self,
        caregiver: &CaregiverId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        hours: f64,
    ) {
        *self
            .added_hours
            .entry((caregiver.clone(), week_start(date)))
            .or_insert(0.0) += hours;
        self.commitments
            .entry(caregiver.clone())
            .or_default()
            .push((date, start, end));
    }
}

/// Passe gloutonne sur les vacations ouvertes de la plage.
///
/// Ordre de traitement : urgence décroissante puis date puis heure de début,
/// tri stable. Une vacation non pourvue est une issue normale, pas une
/// erreur ; une défaillance d'écriture interrompt la passe en renvoyant le
/// bilan partiel (les affectations déjà validées restent acquises).
pub(super) fn auto_fill(
    dir: &mut Directory,
    start_date: NaiveDate,
    end_date: NaiveDate,
    opts: PlanOptions,
    now: DateTime<Utc>,
) -> Result<PlanReport, EngineError> {
    if end_date < start_date {
        return Err(EngineError::InvalidDateRange);
    }

    let mut batch: Vec<OpenShift> = dir
        .open_shifts
        .iter()
        .filter(|s| s.status == ShiftStatus::Open && s.date >= start_date && s.date <= end_date)
        .cloned()
        .collect();
    batch.sort_by(|a, b| {
        b.urgency
            .cmp(&a.urgency)
            .then(a.date.cmp(&b.date))
            .then(a.start.cmp(&b.start))
    });

    let mut state = RunState::snapshot(dir, &batch);
    let mut report = PlanReport {
        total: batch.len(),
        ..PlanReport::default()
    };

    for shift in &batch {
        let outcome = match plan_shift(dir, &state, shift) {
            Ok(outcome) => outcome,
            Err(err) => return Err(abort(report, &batch, err)),
        };

        if let ShiftResolution::Assigned { caregiver, .. } = &outcome.resolution {
            let caregiver = caregiver.clone();
            state.commit(
                &caregiver,
                shift.date,
                shift.start,
                shift.end,
                shift.duration_hours(),
            );
            if !opts.dry_run {
                match apply_assignment(dir, shift, &caregiver, now) {
                    Ok(event) => report.events.push(event),
                    Err(err) => return Err(abort(report, &batch, err)),
                }
            }
            report.filled += 1;
        } else {
            report.failed += 1;
        }
        report.results.push(outcome);
    }

    Ok(report)
}

fn abort(report: PlanReport, batch: &[OpenShift], err: EngineError) -> EngineError {
    EngineError::RunAborted {
        attempted: report.results.len(),
        total: batch.len(),
        reason: err.to_string(),
        report: Box::new(report),
    }
}

fn plan_shift(
    dir: &Directory,
    state: &RunState,
    shift: &OpenShift,
) -> Result<ShiftOutcome, EngineError> {
    let client = dir
        .find_client(&shift.client)
        .ok_or_else(|| EngineError::UnknownClient(shift.client.as_str().to_string()))?;

    let week = week_start(shift.date);
    let shift_hours = shift.duration_hours();

    let mut best: Option<(i32, CaregiverId, Option<f64>, u32)> = None;
    let mut rejected: Vec<RejectedCandidate> = Vec::new();

    for caregiver in &dir.caregivers {
        // pré-filtre : hors vivier si indisponible sur cette fenêtre
        if !caregiver.is_available_for(shift.date, shift.start, shift.end) {
            continue;
        }

        let running = state.running_hours(&caregiver.id, week);

        // barrières dures, dans l'ordre : conflit, plafond, certifications
        let persisted_conflict = find_conflict(
            dir.active_schedules_for(&caregiver.id),
            shift.date,
            shift.start,
            shift.end,
        )
        .is_some();
        if persisted_conflict
            || state.conflicts_with(&caregiver.id, shift.date, shift.start, shift.end)
        {
            rejected.push(RejectedCandidate {
                caregiver: caregiver.id.clone(),
                reason: Disqualification::Conflict,
            });
            continue;
        }

        if running + shift_hours > caregiver.availability.max_hours_per_week {
            rejected.push(RejectedCandidate {
                caregiver: caregiver.id.clone(),
                reason: Disqualification::ExceedsHours,
            });
            continue;
        }

        let missing =
            caregiver.missing_certifications(&client.required_certifications, shift.date);
        if !missing.is_empty() {
            rejected.push(RejectedCandidate {
                caregiver: caregiver.id.clone(),
                reason: Disqualification::MissingCerts { certs: missing },
            });
            continue;
        }

        let familiarity = dir.completed_visits(&caregiver.id, &client.id);
        let distance = geo::distance_miles(caregiver.location, client.location);
        let score = assignment_score(
            running,
            caregiver.availability.max_hours_per_week,
            shift_hours,
            familiarity,
            distance,
        );

        // strictement supérieur : à égalité, le premier du vivier gagne
        if best.as_ref().map_or(true, |(b, ..)| score > *b) {
            best = Some((score, caregiver.id.clone(), distance, familiarity));
        }
    }

    let resolution = match best {
        Some((score, caregiver, distance_miles, familiarity)) => ShiftResolution::Assigned {
            caregiver,
            score,
            distance_miles,
            familiarity,
        },
        None => {
            rejected.truncate(REPORTED_CANDIDATES);
            ShiftResolution::Unfilled {
                candidates: rejected,
            }
        }
    };

    Ok(ShiftOutcome {
        shift: shift.id.clone(),
        client: shift.client.clone(),
        date: shift.date,
        start: shift.start,
        end: shift.end,
        resolution,
    })
}

/// Applique une affectation : insertion du planning ponctuel et passage de
/// la vacation à `filled`, conditionné à ce qu'elle soit encore ouverte.
fn apply_assignment(
    dir: &mut Directory,
    shift: &OpenShift,
    caregiver: &CaregiverId,
    now: DateTime<Utc>,
) -> Result<AuditEvent, EngineError> {
    let schedule = Schedule::one_time(
        caregiver.clone(),
        shift.client.clone(),
        shift.date,
        shift.start,
        shift.end,
    )
    .map_err(|_| EngineError::InvalidTimeWindow)?;
    let schedule_id = schedule.id.clone();

    let stored = dir
        .find_shift_mut(&shift.id)
        .ok_or_else(|| EngineError::UnknownShift(shift.id.as_str().to_string()))?;
    if stored.status != ShiftStatus::Open {
        return Err(EngineError::ShiftNotOpen(shift.id.as_str().to_string()));
    }
    stored.status = ShiftStatus::Filled;
    stored.filled_by = Some(caregiver.clone());
    stored.filled_at = Some(now);

    dir.schedules.push(schedule);

    Ok(AuditEvent {
        action: AuditAction::ShiftFilled,
        shift: shift.id.clone(),
        schedule: Some(schedule_id),
        caregiver: caregiver.clone(),
        client: shift.client.clone(),
        at: now,
    })
}
