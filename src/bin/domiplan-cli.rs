#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use domiplan::{
    audit::{AuditRenderer, TextAudit},
    engine::{Engine, PlanOptions, ShiftResolution},
    io,
    model::{CaregiverId, ClientId, ShiftId},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste d'affectation d'interventions à domicile (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de l'annuaire
    #[arg(long, global = true, default_value = "directory.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publier une vacation ouverte
    PostShift {
        #[arg(long)]
        client: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM
        #[arg(long)]
        end: String,
        #[arg(long, default_value_t = 0)]
        urgency: i32,
    },

    /// Importer des intervenants depuis un CSV
    ImportCaregivers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des vacations ouvertes depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Classer les intervenants pour un créneau chez un bénéficiaire
    Suggest {
        #[arg(long)]
        client: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Nombre de candidats affichés
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Remplir automatiquement les vacations ouvertes d'une plage de dates
    Autofill {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Calcule le bilan sans rien écrire
        #[arg(long)]
        dry_run: bool,
        /// Export CSV du bilan (optionnel)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Instantané de couverture pour une semaine
    Coverage {
        /// YYYY-MM-DD, n'importe quel jour de la semaine visée (défaut : aujourd'hui)
        #[arg(long)]
        week_of: Option<String>,
        /// Export CSV de l'utilisation des intervenants (optionnel)
        #[arg(long)]
        out_caregivers_csv: Option<String>,
        /// Export CSV de la couverture des bénéficiaires (optionnel)
        #[arg(long)]
        out_clients_csv: Option<String>,
    },

    /// Revendiquer une vacation ouverte pour un intervenant
    Claim {
        #[arg(long)]
        shift_id: String,
        #[arg(long)]
        caregiver: String,
    },

    /// Vérifier l'invariant de non-chevauchement sur une semaine
    Check {
        #[arg(long)]
        week_of: Option<String>,
    },

    /// Lister les vacations et optionnellement exporter l'annuaire
    List {
        #[arg(long)]
        out_json: Option<String>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| anyhow::anyhow!("invalid date: {raw}"))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("invalid time: {raw}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;
    let mut engine = match storage.load() {
        Ok(d) => {
            let mut e = Engine::new();
            *e.directory_mut() = d;
            e
        }
        Err(_) => Engine::new(),
    };

    let code = match cli.cmd {
        Commands::PostShift {
            client,
            date,
            start,
            end,
            urgency,
        } => {
            let id = engine.post_shift(
                &ClientId::new(client),
                parse_date(&date)?,
                parse_time(&start)?,
                parse_time(&end)?,
                urgency,
            )?;
            storage.save(engine.directory())?;
            println!("open shift {}", id.as_str());
            0
        }
        Commands::ImportCaregivers { csv } => {
            let caregivers = io::import_caregivers_csv(csv)?;
            engine.add_caregivers(caregivers);
            storage.save(engine.directory())?;
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shifts_csv(csv)?;
            engine.directory_mut().open_shifts.extend(shifts);
            storage.save(engine.directory())?;
            0
        }
        Commands::Suggest {
            client,
            date,
            start,
            end,
            top,
        } => {
            let suggestions = engine.suggest_caregivers(
                &ClientId::new(client),
                parse_date(&date)?,
                parse_time(&start)?,
                parse_time(&end)?,
            )?;
            for s in suggestions.iter().take(top) {
                let distance = s
                    .distance_miles
                    .map(|d| format!("{d:.1} mi"))
                    .unwrap_or_else(|| "? mi".to_string());
                println!(
                    "{:>5} | {} | {} | {}",
                    s.score,
                    s.name,
                    distance,
                    s.reasons.join("; ")
                );
            }
            0
        }
        Commands::Autofill {
            from,
            to,
            dry_run,
            out_csv,
        } => {
            let report = engine.auto_fill(
                parse_date(&from)?,
                parse_date(&to)?,
                PlanOptions { dry_run },
                Utc::now(),
            )?;
            if !dry_run {
                storage.save(engine.directory())?;
            }
            let renderer = TextAudit;
            for event in &report.events {
                println!("{}", renderer.render(event));
            }
            for outcome in &report.results {
                if let ShiftResolution::Unfilled { candidates } = &outcome.resolution {
                    eprintln!(
                        "unfilled: shift {} on {} ({} candidate(s) rejected)",
                        outcome.shift.as_str(),
                        outcome.date,
                        candidates.len()
                    );
                }
            }
            if let Some(path) = out_csv {
                io::export_plan_csv(path, &report)?;
            }
            println!(
                "filled {} / failed {} / total {}",
                report.filled, report.failed, report.total
            );
            0
        }
        Commands::Coverage {
            week_of,
            out_caregivers_csv,
            out_clients_csv,
        } => {
            let week_of = match week_of {
                Some(raw) => parse_date(&raw)?,
                None => Utc::now().date_naive(),
            };
            let report = engine.coverage_overview(week_of);
            for c in &report.caregivers {
                println!(
                    "{} | {:.1}h / {:.1}h | {:.0}%",
                    c.name, c.scheduled_hours, c.max_hours, c.utilization_percent
                );
            }
            for c in &report.clients {
                println!(
                    "{} | {} / {} unit(s){}",
                    c.name,
                    c.scheduled_units,
                    c.authorized_units,
                    if c.is_under_scheduled {
                        " | UNDER-SCHEDULED"
                    } else {
                        ""
                    }
                );
            }
            println!(
                "week of {} | scheduled {:.1}h | slack {:.1}h | shortfall {} unit(s)",
                report.week_of,
                report.summary.total_scheduled_hours,
                report.summary.total_available_hours,
                report.summary.total_shortfall_units
            );
            match (out_caregivers_csv, out_clients_csv) {
                (Some(caregivers), Some(clients)) => {
                    io::export_coverage_csv(caregivers, clients, &report)?;
                }
                (None, None) => {}
                _ => bail!("coverage export needs both --out-caregivers-csv and --out-clients-csv"),
            }
            0
        }
        Commands::Claim {
            shift_id,
            caregiver,
        } => {
            let cid = engine
                .directory()
                .find_caregiver_by_name(&caregiver)
                .map(|c| c.id.clone())
                .unwrap_or_else(|| CaregiverId::new(&caregiver));
            let (schedule_id, event) =
                engine.claim_shift(&ShiftId::new(shift_id), &cid, Utc::now())?;
            storage.save(engine.directory())?;
            println!("{}", TextAudit.render(&event));
            println!("schedule {}", schedule_id.as_str());
            0
        }
        Commands::Check { week_of } => {
            let week_of = match week_of {
                Some(raw) => parse_date(&raw)?,
                None => Utc::now().date_naive(),
            };
            let conflicts = engine.detect_conflicts(week_of);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!(
                        "{} | caregiver {} | {} vs {}",
                        c.date,
                        c.caregiver.as_str(),
                        c.schedule_a.as_str(),
                        c.schedule_b.as_str()
                    );
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::List { out_json } => {
            if let Some(path) = out_json {
                io::export_directory_json(path, engine.directory())?;
            }
            for s in &engine.directory().open_shifts {
                let filled = s
                    .filled_by
                    .as_ref()
                    .and_then(|cid| engine.directory().find_caregiver(cid))
                    .map(|c| c.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | {} {} → {} | {:?} | {}",
                    s.id.as_str(),
                    s.date,
                    s.start.format("%H:%M"),
                    s.end.format("%H:%M"),
                    s.status,
                    filled
                );
            }
            0
        }
    };

    std::process::exit(code);
}
