use super::occurrence::{caregiver_week_hours, find_conflict, week_start};
use super::types::EngineError;
use crate::geo;
use crate::model::{interval_hours, Caregiver, CaregiverId, Client, ClientId, Directory};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

const BASE_SCORE: f64 = 100.0;
const FAMILIARITY_PER_VISIT: f64 = 3.0;
const FAMILIARITY_CAP: f64 = 30.0;
const UNAVAILABLE_PENALTY: f64 = 100.0;
const CONFLICT_PENALTY: f64 = 100.0;
const WORKLOAD_WEIGHT: f64 = 20.0;
const EXCEED_CAP_PENALTY: f64 = 50.0;
const OVERTIME_PENALTY: f64 = 10.0;
const OVERTIME_THRESHOLD_HOURS: f64 = 40.0;
const MISSING_SKILLS_PENALTY: f64 = 40.0;

/// Évaluation d'un candidat pour une fenêtre donnée (classement consultatif).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub caregiver: CaregiverId,
    pub name: String,
    pub is_available: bool,
    pub has_conflict: bool,
    pub would_exceed_hours: bool,
    pub has_required_skills: bool,
    pub missing_certifications: Vec<String>,
    pub distance_miles: Option<f64>,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// Classe tout le vivier pour un créneau chez un bénéficiaire.
///
/// Consultatif : rien n'est éliminatoire ici, même une certification
/// manquante ne fait que pénaliser — ce chemin informe un humain, il
/// n'affecte pas automatiquement.
pub(super) fn suggest_caregivers(
    dir: &Directory,
    client_id: &ClientId,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<Vec<Suggestion>, EngineError> {
    if end <= start {
        return Err(EngineError::InvalidTimeWindow);
    }
    let client = dir
        .find_client(client_id)
        .ok_or_else(|| EngineError::UnknownClient(client_id.as_str().to_string()))?;

    let mut out: Vec<Suggestion> = dir
        .caregivers
        .iter()
        .map(|cg| evaluate(dir, client, cg, date, start, end))
        .collect();

    // tri stable : les ex æquo gardent l'ordre du vivier
    out.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(out)
}

fn evaluate(
    dir: &Directory,
    client: &Client,
    caregiver: &Caregiver,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Suggestion {
    let shift_hours = interval_hours(start, end);
    let committed = caregiver_week_hours(dir, &caregiver.id, week_start(date));
    let max_hours = caregiver.availability.max_hours_per_week;

    let is_available = caregiver.is_available_for(date, start, end);
    let has_conflict =
        find_conflict(dir.active_schedules_for(&caregiver.id), date, start, end).is_some();
    let would_exceed_hours = committed + shift_hours > max_hours;
    let missing = caregiver.missing_certifications(&client.required_certifications, date);
    let familiarity = dir.completed_visits(&caregiver.id, &client.id);
    let distance = geo::distance_miles(caregiver.location, client.location);

    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    let bonus = (f64::from(familiarity) * FAMILIARITY_PER_VISIT).min(FAMILIARITY_CAP);
    if bonus > 0.0 {
        score += bonus;
        reasons.push(format!("{familiarity} prior visit(s) with this client"));
    }

    // indisponibilité et conflit sont indépendants : les deux s'appliquent
    if !is_available {
        score -= UNAVAILABLE_PENALTY;
        reasons.push("unavailable for this window".to_string());
    }
    if has_conflict {
        score -= CONFLICT_PENALTY;
        reasons.push("conflicts with an existing schedule".to_string());
    }

    if max_hours > 0.0 {
        score -= committed / max_hours * WORKLOAD_WEIGHT;
    }
    if would_exceed_hours {
        score -= EXCEED_CAP_PENALTY;
        reasons.push("would exceed weekly hour cap".to_string());
    } else if committed + shift_hours > OVERTIME_THRESHOLD_HOURS {
        score -= OVERTIME_PENALTY;
        reasons.push("pushes weekly hours into overtime".to_string());
    }

    score += distance_adjustment(distance);
    if let Some(d) = distance {
        reasons.push(format!("{d:.1} mi from client"));
    }

    if !missing.is_empty() {
        score -= MISSING_SKILLS_PENALTY;
        reasons.push(format!("missing certification(s): {}", missing.join(", ")));
    }

    Suggestion {
        caregiver: caregiver.id.clone(),
        name: caregiver.name.clone(),
        is_available,
        has_conflict,
        would_exceed_hours,
        has_required_skills: missing.is_empty(),
        missing_certifications: missing,
        distance_miles: distance,
        score: score.round() as i32,
        reasons,
    }
}

/// Score utilisé par la passe automatique.
///
/// Volontairement distinct du classement consultatif : dépassement d'heures
/// et certifications manquantes sont éliminatoires en amont et ne pèsent
/// donc pas ici. Restent l'ancienneté de la relation, le ratio de charge,
/// les heures supplémentaires et la distance.
pub(super) fn assignment_score(
    committed_hours: f64,
    max_hours: f64,
    shift_hours: f64,
    familiarity: u32,
    distance: Option<f64>,
) -> i32 {
    let mut score = BASE_SCORE;
    score += (f64::from(familiarity) * FAMILIARITY_PER_VISIT).min(FAMILIARITY_CAP);
    if max_hours > 0.0 {
        score -= committed_hours / max_hours * WORKLOAD_WEIGHT;
    }
    if committed_hours + shift_hours > OVERTIME_THRESHOLD_HOURS {
        score -= OVERTIME_PENALTY;
    }
    score += distance_adjustment(distance);
    score.round() as i32
}

/// Paliers kilométriques — enfin, en milles. Distance inconnue : aucun avis.
fn distance_adjustment(distance: Option<f64>) -> f64 {
    match distance {
        None => 0.0,
        Some(d) if d <= 5.0 => 20.0,
        Some(d) if d <= 10.0 => 10.0,
        Some(d) if d <= 20.0 => 5.0,
        Some(d) if d > 30.0 => -15.0,
        Some(_) => 0.0,
    }
}
