use super::occurrence::{caregiver_week_hours, find_conflict, week_start};
use super::types::EngineError;
use crate::audit::{AuditAction, AuditEvent};
use crate::model::{CaregiverId, Directory, Schedule, ScheduleId, ShiftId, ShiftStatus};
use chrono::{DateTime, Utc};

/// Revendication directe d'une vacation par un intervenant.
///
/// Mise à jour conditionnelle : échoue si la vacation n'est plus ouverte
/// (deux acteurs concurrents — le second reçoit `ShiftNotOpen`, pas une
/// erreur générique). Mêmes barrières dures que la passe automatique.
pub(super) fn claim_shift(
    dir: &mut Directory,
    shift_id: &ShiftId,
    caregiver_id: &CaregiverId,
    now: DateTime<Utc>,
) -> Result<(ScheduleId, AuditEvent), EngineError> {
    let shift = dir
        .find_shift(shift_id)
        .ok_or_else(|| EngineError::UnknownShift(shift_id.as_str().to_string()))?
        .clone();
    if shift.status != ShiftStatus::Open {
        return Err(EngineError::ShiftNotOpen(shift_id.as_str().to_string()));
    }

    let caregiver = dir
        .find_caregiver(caregiver_id)
        .ok_or_else(|| EngineError::UnknownCaregiver(caregiver_id.as_str().to_string()))?;
    let client = dir
        .find_client(&shift.client)
        .ok_or_else(|| EngineError::UnknownClient(shift.client.as_str().to_string()))?;

    if !caregiver.is_available_for(shift.date, shift.start, shift.end) {
        return Err(EngineError::ClaimRejected("caregiver unavailable for this window"));
    }
    if find_conflict(
        dir.active_schedules_for(caregiver_id),
        shift.date,
        shift.start,
        shift.end,
    )
    .is_some()
    {
        return Err(EngineError::ClaimRejected("conflicts with an existing schedule"));
    }

    let committed = caregiver_week_hours(dir, caregiver_id, week_start(shift.date));
    if committed + shift.duration_hours() > caregiver.availability.max_hours_per_week {
        return Err(EngineError::ClaimRejected("would exceed weekly hour cap"));
    }

    if !caregiver
        .missing_certifications(&client.required_certifications, shift.date)
        .is_empty()
    {
        return Err(EngineError::ClaimRejected("missing required certification(s)"));
    }

    let schedule = Schedule::one_time(
        caregiver_id.clone(),
        shift.client.clone(),
        shift.date,
        shift.start,
        shift.end,
    )
    .map_err(|_| EngineError::InvalidTimeWindow)?;
    let schedule_id = schedule.id.clone();

    let stored = dir
        .find_shift_mut(shift_id)
        .ok_or_else(|| EngineError::UnknownShift(shift_id.as_str().to_string()))?;
    stored.status = ShiftStatus::Filled;
    stored.filled_by = Some(caregiver_id.clone());
    stored.filled_at = Some(now);
    dir.schedules.push(schedule);

    let event = AuditEvent {
        action: AuditAction::ShiftClaimed,
        shift: shift_id.clone(),
        schedule: Some(schedule_id.clone()),
        caregiver: caregiver_id.clone(),
        client: shift.client,
        at: now,
    };
    Ok((schedule_id, event))
}
