use crate::model::{CaregiverId, ClientId, ScheduleId, ShiftId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Nature de l'écriture tracée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ShiftFilled,
    ShiftClaimed,
}

/// Trace d'une écriture du moteur, destinée à la couche d'audit externe.
///
/// Le moteur ne journalise rien lui-même : il expose qui a changé quoi, et
/// quand, pour chaque écriture réalisée.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub shift: ShiftId,
    pub schedule: Option<ScheduleId>,
    pub caregiver: CaregiverId,
    pub client: ClientId,
    pub at: DateTime<Utc>,
}

/// Permet de customiser le rendu de la trace (texte, ligne de log, etc.).
pub trait AuditRenderer {
    fn render(&self, event: &AuditEvent) -> String;
}

/// Gabarit texte simple, une ligne par écriture.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAudit;

impl AuditRenderer for TextAudit {
    fn render(&self, event: &AuditEvent) -> String {
        let action = match event.action {
            AuditAction::ShiftFilled => "filled",
            AuditAction::ShiftClaimed => "claimed",
        };
        format!(
            "{at} shift {shift} {action} by caregiver {caregiver} for client {client}",
            at = event.at.to_rfc3339(),
            shift = event.shift.as_str(),
            caregiver = event.caregiver.as_str(),
            client = event.client.as_str(),
        )
    }
}
