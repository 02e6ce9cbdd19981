use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiant fort pour Caregiver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaregiverId(String);

impl CaregiverId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Schedule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(String);

impl ScheduleId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour OpenShift
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durée d'une fenêtre horaire `[start, end)` en heures décimales.
///
/// Seule source de vérité pour la conversion fenêtre → heures : le calcul de
/// charge, la planification et la couverture passent tous par ici.
pub fn interval_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    (end - start).num_minutes() as f64 / 60.0
}

/// Position géographique en degrés décimaux.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Certification détenue par un intervenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl Certification {
    pub fn new<N: Into<String>>(name: N, expires_on: Option<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            expires_on,
        }
    }

    /// Une certification expirée ne compte plus comme détenue.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.expires_on.map_or(true, |exp| date <= exp)
    }
}

/// Statut global de disponibilité d'un intervenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
}

/// Fenêtre de travail pour un jour de semaine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayWindow {
    pub available: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Disponibilité hebdomadaire. Jours indexés 0 = dimanche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub days: [DayWindow; 7],
    pub max_hours_per_week: f64,
    pub status: AvailabilityStatus,
}

impl WeeklyAvailability {
    /// Disponibilité tous les jours, toute la journée.
    pub fn full_time(max_hours_per_week: f64) -> Self {
        let day = DayWindow {
            available: true,
            start: NaiveTime::MIN,
            end: NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        };
        Self {
            days: [day; 7],
            max_hours_per_week,
            status: AvailabilityStatus::Available,
        }
    }
}

/// Période d'exclusion dure (intervalle de dates inclusif).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BlackoutPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("blackout end must not precede start".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Intervenant à domicile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caregiver {
    pub id: CaregiverId,
    pub name: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<Certification>,
    pub availability: WeeklyAvailability,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blackouts: Vec<BlackoutPeriod>,
}

impl Caregiver {
    pub fn new<N: Into<String>>(name: N, availability: WeeklyAvailability) -> Self {
        Self {
            id: CaregiverId::random(),
            name: name.into(),
            location: None,
            certifications: Vec::new(),
            availability,
            blackouts: Vec::new(),
        }
    }

    /// Certification valide à la date donnée ?
    pub fn holds_certification(&self, name: &str, on: NaiveDate) -> bool {
        self.certifications
            .iter()
            .any(|c| c.name == name && c.is_valid_on(on))
    }

    /// Certifications requises non détenues (ou expirées) à la date donnée.
    pub fn missing_certifications(&self, required: &[String], on: NaiveDate) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.holds_certification(name, on))
            .cloned()
            .collect()
    }

    pub fn is_blacked_out(&self, date: NaiveDate) -> bool {
        self.blackouts.iter().any(|b| b.contains(date))
    }

    /// L'intervenant peut-il travailler cette fenêtre ?
    /// Statut global, jour de semaine, fenêtre du jour et exclusions.
    pub fn is_available_for(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        if self.availability.status != AvailabilityStatus::Available {
            return false;
        }
        if self.is_blacked_out(date) {
            return false;
        }
        let day = &self.availability.days[date.weekday().num_days_from_sunday() as usize];
        day.available && day.start <= start && end <= day.end
    }
}

/// Bénéficiaire de soins à domicile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_certifications: Vec<String>,
    /// Unités de 15 minutes accordées par le payeur, pour la couverture
    /// uniquement (jamais pour l'éligibilité).
    #[serde(default)]
    pub weekly_authorized_units: Option<u32>,
}

impl Client {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: ClientId::random(),
            name: name.into(),
            location: None,
            required_certifications: Vec::new(),
            weekly_authorized_units: None,
        }
    }
}

/// Fréquence d'un gabarit récurrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Weekly,
    Biweekly,
}

/// Créneau daté (ponctuel) ou gabarit récurrent (jour 0 = dimanche).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    OneTime { date: NaiveDate },
    Recurring { weekday: u8 },
}

fn default_active() -> bool {
    true
}

/// Engagement intervenant ↔ bénéficiaire, ponctuel ou récurrent.
/// Jamais supprimé physiquement : `is_active = false` (exigence d'audit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub caregiver: CaregiverId,
    pub client: ClientId,
    pub slot: Slot,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub frequency: Frequency,
    /// Les occurrences récurrentes antérieures à cette date ne se matérialisent pas.
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    /// Date de référence pour la parité quinzaine.
    #[serde(default)]
    pub anchor_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Schedule {
    /// Crée un créneau ponctuel en validant que `end > start`.
    pub fn one_time(
        caregiver: CaregiverId,
        client: ClientId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self {
            id: ScheduleId::random(),
            caregiver,
            client,
            slot: Slot::OneTime { date },
            start,
            end,
            frequency: Frequency::Weekly,
            effective_date: None,
            anchor_date: None,
            is_active: true,
        })
    }

    /// Crée un gabarit récurrent (`weekday` 0–6, 0 = dimanche).
    pub fn recurring(
        caregiver: CaregiverId,
        client: ClientId,
        weekday: u8,
        start: NaiveTime,
        end: NaiveTime,
        frequency: Frequency,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        if weekday > 6 {
            return Err("weekday must be in 0..=6".to_string());
        }
        Ok(Self {
            id: ScheduleId::random(),
            caregiver,
            client,
            slot: Slot::Recurring { weekday },
            start,
            end,
            frequency,
            effective_date: None,
            anchor_date: None,
            is_active: true,
        })
    }

    pub fn duration_hours(&self) -> f64 {
        interval_hours(self.start, self.end)
    }
}

/// Statut d'une vacation ouverte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Filled,
    Cancelled,
}

/// Vacation en attente d'affectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenShift {
    pub id: ShiftId,
    pub client: ClientId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub urgency: i32,
    pub status: ShiftStatus,
    #[serde(default)]
    pub filled_by: Option<CaregiverId>,
    #[serde(default)]
    pub filled_at: Option<DateTime<Utc>>,
}

impl OpenShift {
    /// Crée une vacation ouverte en validant que `end > start`.
    pub fn new(
        client: ClientId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        urgency: i32,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self {
            id: ShiftId::random(),
            client,
            date,
            start,
            end,
            urgency,
            status: ShiftStatus::Open,
            filled_by: None,
            filled_at: None,
        })
    }

    pub fn duration_hours(&self) -> f64 {
        interval_hours(self.start, self.end)
    }
}

/// Compteur de visites réalisées pour un couple intervenant/bénéficiaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitTally {
    pub caregiver: CaregiverId,
    pub client: ClientId,
    pub completed_visits: u32,
}

/// Annuaire complet chargé depuis le stockage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Directory {
    pub caregivers: Vec<Caregiver>,
    pub clients: Vec<Client>,
    pub schedules: Vec<Schedule>,
    pub open_shifts: Vec<OpenShift>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visit_history: Vec<VisitTally>,
}

impl Directory {
    pub fn find_caregiver<'a>(&'a self, id: &CaregiverId) -> Option<&'a Caregiver> {
        self.caregivers.iter().find(|c| &c.id == id)
    }
    pub fn find_caregiver_by_name<'a>(&'a self, name: &str) -> Option<&'a Caregiver> {
        self.caregivers.iter().find(|c| c.name == name)
    }
    pub fn find_client<'a>(&'a self, id: &ClientId) -> Option<&'a Client> {
        self.clients.iter().find(|c| &c.id == id)
    }
    pub fn find_shift<'a>(&'a self, id: &ShiftId) -> Option<&'a OpenShift> {
        self.open_shifts.iter().find(|s| &s.id == id)
    }
    pub fn find_shift_mut(&mut self, id: &ShiftId) -> Option<&mut OpenShift> {
        self.open_shifts.iter_mut().find(|s| &s.id == id)
    }

    /// Plannings actifs d'un intervenant.
    pub fn active_schedules_for<'a>(
        &'a self,
        caregiver: &'a CaregiverId,
    ) -> impl Iterator<Item = &'a Schedule> {
        self.schedules
            .iter()
            .filter(move |s| s.is_active && &s.caregiver == caregiver)
    }

    /// Visites déjà réalisées par un intervenant chez un bénéficiaire.
    pub fn completed_visits(&self, caregiver: &CaregiverId, client: &ClientId) -> u32 {
        self.visit_history
            .iter()
            .filter(|v| &v.caregiver == caregiver && &v.client == client)
            .map(|v| v.completed_visits)
            .sum()
    }
}
