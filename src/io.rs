use crate::engine::{CoverageReport, PlanReport, ShiftResolution};
use crate::model::{
    Caregiver, Certification, ClientId, Directory, GeoPoint, OpenShift, WeeklyAvailability,
};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import d'intervenants depuis CSV.
/// Header `name,max_hours[,latitude,longitude][,certifications]`,
/// certifications au format `CNA:2027-06-30;HHA` (échéance optionnelle).
pub fn import_caregivers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Caregiver>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid caregiver row (empty name)");
        }
        let max_hours: f64 = rec
            .get(1)
            .context("missing max_hours")?
            .trim()
            .parse()
            .with_context(|| format!("invalid max_hours for {name}"))?;
        let mut caregiver = Caregiver::new(name, WeeklyAvailability::full_time(max_hours));

        let lat = rec.get(2).map(str::trim).filter(|s| !s.is_empty());
        let lon = rec.get(3).map(str::trim).filter(|s| !s.is_empty());
        // coordonnées optionnelles, mais jamais l'une sans l'autre
        caregiver.location = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint {
                latitude: lat
                    .parse()
                    .with_context(|| format!("invalid latitude for {name}"))?,
                longitude: lon
                    .parse()
                    .with_context(|| format!("invalid longitude for {name}"))?,
            }),
            (None, None) => None,
            _ => bail!("caregiver {name} has only one coordinate"),
        };

        if let Some(certs) = rec.get(4) {
            let certs = certs.trim();
            if !certs.is_empty() {
                caregiver.certifications = parse_certifications(certs)
                    .with_context(|| format!("invalid certifications for {name}"))?;
            }
        }
        out.push(caregiver);
    }
    Ok(out)
}

fn parse_certifications(raw: &str) -> anyhow::Result<Vec<Certification>> {
    raw.split(';')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| parse_certification_chunk(chunk.trim()))
        .collect()
}

fn parse_certification_chunk(chunk: &str) -> anyhow::Result<Certification> {
    if let Some((name, expiry)) = chunk.split_once(':') {
        let expires = NaiveDate::parse_from_str(expiry.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid expiry date: {expiry}"))?;
        Ok(Certification::new(name.trim(), Some(expires)))
    } else {
        Ok(Certification::new(chunk, None))
    }
}

/// Import de vacations ouvertes : header `client_id,date,start,end,urgency`.
pub fn import_shifts_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<OpenShift>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let client = rec.get(0).context("missing client_id")?.trim();
        let date = rec.get(1).context("missing date")?.trim();
        let start = rec.get(2).context("missing start")?.trim();
        let end = rec.get(3).context("missing end")?.trim();
        let urgency = rec.get(4).map(str::trim).filter(|s| !s.is_empty());

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").context("date YYYY-MM-DD")?;
        let start = parse_time(start).context("start HH:MM")?;
        let end = parse_time(end).context("end HH:MM")?;
        let urgency: i32 = urgency.map_or(Ok(0), str::parse).context("urgency integer")?;

        let shift = OpenShift::new(ClientId::new(client), date, start, end, urgency)
            .map_err(anyhow::Error::msg)?;
        out.push(shift);
    }
    Ok(out)
}

fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("invalid time: {raw}"))
}

/// Export JSON de l'annuaire (jolie mise en forme).
pub fn export_directory_json<P: AsRef<Path>>(path: P, directory: &Directory) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(directory)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV d'un bilan de passe :
/// header `shift_id,client_id,date,start,end,outcome,caregiver,score`.
pub fn export_plan_csv<P: AsRef<Path>>(path: P, report: &PlanReport) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "shift_id", "client_id", "date", "start", "end", "outcome", "caregiver", "score",
    ])?;
    for outcome in &report.results {
        let (status, caregiver, score) = match &outcome.resolution {
            ShiftResolution::Assigned {
                caregiver, score, ..
            } => ("assigned", caregiver.as_str().to_string(), score.to_string()),
            ShiftResolution::Unfilled { .. } => ("unfilled", String::new(), String::new()),
        };
        let date = outcome.date.to_string();
        let start = outcome.start.format("%H:%M").to_string();
        let end = outcome.end.format("%H:%M").to_string();
        w.write_record([
            outcome.shift.as_str(),
            outcome.client.as_str(),
            date.as_str(),
            start.as_str(),
            end.as_str(),
            status,
            caregiver.as_str(),
            score.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV d'un instantané de couverture, deux fichiers en un appel :
/// utilisation des intervenants puis couverture des bénéficiaires.
pub fn export_coverage_csv<P: AsRef<Path>>(
    caregivers_path: P,
    clients_path: P,
    report: &CoverageReport,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new()
        .has_headers(true)
        .from_path(caregivers_path)?;
    w.write_record([
        "caregiver_id",
        "name",
        "scheduled_hours",
        "max_hours",
        "remaining_hours",
        "utilization_percent",
    ])?;
    for c in &report.caregivers {
        let scheduled = format!("{:.2}", c.scheduled_hours);
        let max = format!("{:.2}", c.max_hours);
        let remaining = format!("{:.2}", c.remaining_hours);
        let utilization = format!("{:.1}", c.utilization_percent);
        w.write_record([
            c.caregiver.as_str(),
            c.name.as_str(),
            scheduled.as_str(),
            max.as_str(),
            remaining.as_str(),
            utilization.as_str(),
        ])?;
    }
    w.flush()?;

    let mut w = WriterBuilder::new()
        .has_headers(true)
        .from_path(clients_path)?;
    w.write_record([
        "client_id",
        "name",
        "authorized_units",
        "scheduled_units",
        "shortfall_units",
        "under_scheduled",
    ])?;
    for c in &report.clients {
        let authorized = c.authorized_units.to_string();
        let scheduled = c.scheduled_units.to_string();
        let shortfall = c.shortfall_units.to_string();
        w.write_record([
            c.client.as_str(),
            c.name.as_str(),
            authorized.as_str(),
            scheduled.as_str(),
            shortfall.as_str(),
            if c.is_under_scheduled { "yes" } else { "no" },
        ])?;
    }
    w.flush()?;
    Ok(())
}
