use super::occurrence::{caregiver_week_hours, client_week_hours, week_start};
use crate::model::{CaregiverId, ClientId, Directory};
use chrono::NaiveDate;
use serde::Serialize;

/// Heures que représente une unité payeur (15 minutes).
const HOURS_PER_UNIT: f64 = 0.25;

/// Utilisation hebdomadaire d'un intervenant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaregiverUtilization {
    pub caregiver: CaregiverId,
    pub name: String,
    pub scheduled_hours: f64,
    pub max_hours: f64,
    pub remaining_hours: f64,
    pub utilization_percent: f64,
}

/// Couverture d'un bénéficiaire disposant d'un volume autorisé.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientCoverage {
    pub client: ClientId,
    pub name: String,
    pub authorized_units: u32,
    pub authorized_hours: f64,
    pub scheduled_hours: f64,
    pub scheduled_units: u32,
    pub shortfall_units: u32,
    pub is_under_scheduled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub total_scheduled_hours: f64,
    pub total_available_hours: f64,
    pub total_shortfall_units: u32,
    pub total_shortfall_hours: f64,
}

/// Instantané de couverture pour une semaine (alignée dimanche).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub week_of: NaiveDate,
    pub caregivers: Vec<CaregiverUtilization>,
    pub clients: Vec<ClientCoverage>,
    pub under_scheduled: Vec<ClientCoverage>,
    pub summary: CoverageSummary,
}

/// Agrégation en lecture seule : heures planifiées vs plafonds côté
/// intervenants, unités planifiées vs autorisées côté bénéficiaires.
pub(super) fn coverage_overview(dir: &Directory, week_of: NaiveDate) -> CoverageReport {
    let week = week_start(week_of);

    let caregivers: Vec<CaregiverUtilization> = dir
        .caregivers
        .iter()
        .map(|cg| {
            let scheduled = caregiver_week_hours(dir, &cg.id, week);
            let max = cg.availability.max_hours_per_week;
            CaregiverUtilization {
                caregiver: cg.id.clone(),
                name: cg.name.clone(),
                scheduled_hours: scheduled,
                max_hours: max,
                remaining_hours: (max - scheduled).max(0.0),
                utilization_percent: if max > 0.0 { scheduled / max * 100.0 } else { 0.0 },
            }
        })
        .collect();

    // sans volume autorisé, rien à comparer : le bénéficiaire est hors analyse
    let clients: Vec<ClientCoverage> = dir
        .clients
        .iter()
        .filter_map(|client| {
            let units = client.weekly_authorized_units.filter(|u| *u > 0)?;
            let scheduled_hours = client_week_hours(dir, &client.id, week);
            let scheduled_units = (scheduled_hours / HOURS_PER_UNIT).round() as u32;
            let shortfall_units = units.saturating_sub(scheduled_units);
            Some(ClientCoverage {
                client: client.id.clone(),
                name: client.name.clone(),
                authorized_units: units,
                authorized_hours: f64::from(units) * HOURS_PER_UNIT,
                scheduled_hours,
                scheduled_units,
                shortfall_units,
                is_under_scheduled: shortfall_units > 0,
            })
        })
        .collect();

    let under_scheduled: Vec<ClientCoverage> = clients
        .iter()
        .filter(|c| c.is_under_scheduled)
        .cloned()
        .collect();

    let total_shortfall_units: u32 = clients.iter().map(|c| c.shortfall_units).sum();
    let summary = CoverageSummary {
        total_scheduled_hours: caregivers.iter().map(|c| c.scheduled_hours).sum(),
        total_available_hours: caregivers.iter().map(|c| c.remaining_hours).sum(),
        total_shortfall_units,
        total_shortfall_hours: f64::from(total_shortfall_units) * HOURS_PER_UNIT,
    };

    CoverageReport {
        week_of: week,
        caregivers,
        clients,
        under_scheduled,
        summary,
    }
}
