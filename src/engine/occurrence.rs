use crate::model::{CaregiverId, ClientId, Directory, Frequency, Schedule, Slot};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

/// Chevauchement strict de deux fenêtres `[start, end)`.
/// Des bornes identiques se chevauchent ; des fenêtres adjacentes non.
pub fn windows_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Le planning matérialise-t-il une occurrence à la date donnée ?
///
/// Unique autorité de résolution : scoring, planification, couverture et
/// contrôle de cohérence posent tous la question ici.
pub fn occurs_on(schedule: &Schedule, date: NaiveDate) -> bool {
    match schedule.slot {
        Slot::OneTime { date: d } => d == date,
        Slot::Recurring { weekday } => {
            if u32::from(weekday) != date.weekday().num_days_from_sunday() {
                return false;
            }
            if let Some(effective) = schedule.effective_date {
                if date < effective {
                    return false;
                }
            }
            match schedule.frequency {
                Frequency::Weekly => true,
                Frequency::Biweekly => biweekly_on(schedule, date),
            }
        }
    }
}

fn biweekly_on(schedule: &Schedule, date: NaiveDate) -> bool {
    // Faute d'ancre, la date d'effet sert de référence ; sans aucune des
    // deux le gabarit se comporte comme un hebdomadaire.
    let Some(anchor) = schedule.anchor_date.or(schedule.effective_date) else {
        return true;
    };
    let weeks = (date - anchor).num_days().div_euclid(7);
    weeks.rem_euclid(2) == 0
}

/// Premier planning dont une occurrence chevauche la fenêtre cible.
pub fn find_conflict<'a, I>(
    schedules: I,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<&'a Schedule>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    schedules
        .into_iter()
        .find(|s| occurs_on(s, date) && windows_overlap(s.start, s.end, start, end))
}

/// Dimanche de la semaine contenant `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn week_days(week: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..7).map(move |offset| week + Duration::days(offset))
}

/// Heures planifiées d'un intervenant sur la semaine commençant à `week`
/// (dimanche). Les ponctuels datés dans la semaine comptent ; les gabarits
/// récurrents comptent chaque jour où ils se résolvent.
pub fn caregiver_week_hours(dir: &Directory, caregiver: &CaregiverId, week: NaiveDate) -> f64 {
    week_days(week)
        .map(|day| {
            dir.active_schedules_for(caregiver)
                .filter(|s| occurs_on(s, day))
                .map(Schedule::duration_hours)
                .sum::<f64>()
        })
        .sum()
}

/// Heures planifiées chez un bénéficiaire sur la semaine, mêmes règles.
pub fn client_week_hours(dir: &Directory, client: &ClientId, week: NaiveDate) -> f64 {
    week_days(week)
        .map(|day| {
            dir.schedules
                .iter()
                .filter(|s| s.is_active && &s.client == client && occurs_on(s, day))
                .map(Schedule::duration_hours)
                .sum::<f64>()
        })
        .sum()
}
