use super::occurrence::{occurs_on, week_start, windows_overlap};
use crate::model::{CaregiverId, Directory, Schedule, ScheduleId};
use chrono::{Duration, NaiveDate};

/// Paire de plannings actifs qui se chevauchent pour un même intervenant
/// sur une date résolue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub caregiver: CaregiverId,
    pub schedule_a: ScheduleId,
    pub schedule_b: ScheduleId,
    pub date: NaiveDate,
}

/// Contrôle de cohérence : deux plannings actifs d'un même intervenant ne
/// doivent jamais se chevaucher sur une même date résolue. Balaye les sept
/// jours de la semaine contenant `week_of`.
pub(super) fn detect_conflicts(dir: &Directory, week_of: NaiveDate) -> Vec<Conflict> {
    let week = week_start(week_of);
    let mut out = Vec::new();

    for caregiver in &dir.caregivers {
        let schedules: Vec<&Schedule> = dir.active_schedules_for(&caregiver.id).collect();

        for offset in 0..7 {
            let day = week + Duration::days(offset);
            let resolved: Vec<&Schedule> = schedules
                .iter()
                .copied()
                .filter(|s| occurs_on(s, day))
                .collect();

            for (idx, a) in resolved.iter().enumerate() {
                for b in resolved.iter().skip(idx + 1) {
                    if windows_overlap(a.start, a.end, b.start, b.end) {
                        out.push(Conflict {
                            caregiver: caregiver.id.clone(),
                            schedule_a: a.id.clone(),
                            schedule_b: b.id.clone(),
                            date: day,
                        });
                    }
                }
            }
        }
    }

    out
}
