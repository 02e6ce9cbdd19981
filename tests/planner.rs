#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use domiplan::engine::{Disqualification, PlanOptions, ShiftResolution};
use domiplan::model::{
    Caregiver, Certification, Client, ClientId, OpenShift, Schedule, ShiftStatus,
    WeeklyAvailability,
};
use domiplan::{Engine, EngineError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 1, 8, 0, 0).unwrap()
}

fn caregiver(name: &str, max_hours: f64) -> Caregiver {
    Caregiver::new(name, WeeklyAvailability::full_time(max_hours))
}

fn engine_with_client(required_certs: &[&str]) -> (Engine, ClientId) {
    let mut engine = Engine::new();
    let mut client = Client::new("Ada");
    client.required_certifications = required_certs.iter().map(|s| s.to_string()).collect();
    let id = client.id.clone();
    engine.add_clients(vec![client]);
    (engine, id)
}

#[test]
fn certification_gate_assigns_the_certified_caregiver() {
    let (mut engine, client) = engine_with_client(&["CNA"]);
    let without = caregiver("without", 40.0);
    let mut with = caregiver("with", 40.0);
    with.certifications = vec![Certification::new("CNA", None)];
    let with_id = with.id.clone();
    engine.add_caregivers(vec![without, with]);

    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    assert_eq!((report.filled, report.failed, report.total), (1, 0, 1));
    match &report.results[0].resolution {
        ShiftResolution::Assigned { caregiver, .. } => assert_eq!(caregiver, &with_id),
        other => panic!("expected assignment, got {other:?}"),
    }
    assert_eq!(report.events.len(), 1);
}

#[test]
fn missing_certs_leave_shift_unfilled_even_when_advisory_score_is_positive() {
    let (mut engine, client) = engine_with_client(&["CNA"]);
    engine.add_caregivers(vec![caregiver("without", 40.0)]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();

    let ranked = engine
        .suggest_caregivers(&client, date(2025, 11, 4), time(9, 0), time(12, 0))
        .unwrap();
    assert!(ranked[0].score > 0);

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    assert_eq!(report.failed, 1);
    match &report.results[0].resolution {
        ShiftResolution::Unfilled { candidates } => {
            assert_eq!(candidates.len(), 1);
            assert_eq!(
                candidates[0].reason,
                Disqualification::MissingCerts {
                    certs: vec!["CNA".to_string()]
                }
            );
        }
        other => panic!("expected unfilled, got {other:?}"),
    }
}

#[test]
fn hour_cap_is_a_hard_gate() {
    let (mut engine, client) = engine_with_client(&[]);
    let over = caregiver("over", 10.0);
    // 8 h déjà engagées sur la même semaine
    engine.directory_mut().schedules.push(
        Schedule::one_time(
            over.id.clone(),
            client.clone(),
            date(2025, 11, 3),
            time(8, 0),
            time(16, 0),
        )
        .unwrap(),
    );
    engine.add_caregivers(vec![over]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(13, 0), 0)
        .unwrap();

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    match &report.results[0].resolution {
        ShiftResolution::Unfilled { candidates } => {
            assert_eq!(candidates[0].reason, Disqualification::ExceedsHours);
        }
        other => panic!("expected unfilled, got {other:?}"),
    }
}

#[test]
fn exactly_at_cap_is_still_eligible() {
    let (mut engine, client) = engine_with_client(&[]);
    let exact = caregiver("exact", 12.0);
    engine.directory_mut().schedules.push(
        Schedule::one_time(
            exact.id.clone(),
            client.clone(),
            date(2025, 11, 3),
            time(8, 0),
            time(16, 0),
        )
        .unwrap(),
    );
    engine.add_caregivers(vec![exact]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(13, 0), 0)
        .unwrap();

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    assert_eq!(report.filled, 1);
}

#[test]
fn no_double_booking_within_a_run() {
    let (mut engine, client) = engine_with_client(&[]);
    engine.add_caregivers(vec![caregiver("solo", 40.0)]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();
    engine
        .post_shift(&client, date(2025, 11, 4), time(10, 0), time(13, 0), 0)
        .unwrap();

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    assert_eq!((report.filled, report.failed), (1, 1));
    match &report.results[1].resolution {
        ShiftResolution::Unfilled { candidates } => {
            assert_eq!(candidates[0].reason, Disqualification::Conflict);
        }
        other => panic!("expected unfilled, got {other:?}"),
    }
    // l'unique planning créé ne chevauche rien
    assert_eq!(engine.directory().schedules.len(), 1);
}

#[test]
fn urgency_then_date_then_start_ordering() {
    let (mut engine, client) = engine_with_client(&[]);
    let s1 = engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(10, 0), 0)
        .unwrap();
    let s2 = engine
        .post_shift(&client, date(2025, 11, 5), time(9, 0), time(10, 0), 5)
        .unwrap();
    let s3 = engine
        .post_shift(&client, date(2025, 11, 3), time(9, 0), time(10, 0), 0)
        .unwrap();

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::dry_run(),
            now(),
        )
        .unwrap();
    let order: Vec<_> = report.results.iter().map(|r| r.shift.clone()).collect();
    assert_eq!(order, vec![s2, s3, s1]);
}

#[test]
fn dry_run_computes_the_same_results_and_writes_nothing() {
    let (mut engine, client) = engine_with_client(&[]);
    engine.add_caregivers(vec![caregiver("a", 40.0), caregiver("b", 40.0)]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();
    engine
        .post_shift(&client, date(2025, 11, 5), time(9, 0), time(12, 0), 1)
        .unwrap();

    let dry = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::dry_run(),
            now(),
        )
        .unwrap();
    assert!(dry.events.is_empty());
    assert!(engine.directory().schedules.is_empty());
    assert!(engine
        .directory()
        .open_shifts
        .iter()
        .all(|s| s.status == ShiftStatus::Open));

    let real = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    assert_eq!(dry.results, real.results);
    assert_eq!(real.events.len(), 2);
    assert!(engine
        .directory()
        .open_shifts
        .iter()
        .all(|s| s.status == ShiftStatus::Filled && s.filled_at == Some(now())));
}

#[test]
fn higher_scoring_caregiver_wins() {
    let (mut engine, client) = engine_with_client(&[]);
    let stranger = caregiver("stranger", 40.0);
    let familiar = caregiver("familiar", 40.0);
    engine.directory_mut().visit_history.push(
        domiplan::model::VisitTally {
            caregiver: familiar.id.clone(),
            client: client.clone(),
            completed_visits: 4,
        },
    );
    let familiar_id = familiar.id.clone();
    engine.add_caregivers(vec![stranger, familiar]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();

    let report = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap();
    match &report.results[0].resolution {
        ShiftResolution::Assigned {
            caregiver,
            familiarity,
            ..
        } => {
            assert_eq!(caregiver, &familiar_id);
            assert_eq!(*familiarity, 4);
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn dangling_client_aborts_with_partial_report() {
    let (mut engine, client) = engine_with_client(&[]);
    engine.add_caregivers(vec![caregiver("solo", 40.0)]);
    engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 5)
        .unwrap();
    // vacation orpheline, traitée en second (urgence moindre)
    engine.directory_mut().open_shifts.push(
        OpenShift::new(
            ClientId::new("ghost"),
            date(2025, 11, 5),
            time(9, 0),
            time(12, 0),
            0,
        )
        .unwrap(),
    );

    let err = engine
        .auto_fill(
            date(2025, 11, 1),
            date(2025, 11, 30),
            PlanOptions::default(),
            now(),
        )
        .unwrap_err();
    match err {
        EngineError::RunAborted {
            attempted,
            total,
            report,
            ..
        } => {
            assert_eq!((attempted, total), (1, 2));
            assert_eq!(report.filled, 1);
            assert_eq!(report.results.len(), 1);
        }
        other => panic!("expected RunAborted, got {other}"),
    }
    // l'affectation déjà validée reste acquise
    assert_eq!(engine.directory().schedules.len(), 1);
}

#[test]
fn claim_is_conditional_on_open_status() {
    let (mut engine, client) = engine_with_client(&[]);
    let first = caregiver("first", 40.0);
    let second = caregiver("second", 40.0);
    let first_id = first.id.clone();
    let second_id = second.id.clone();
    engine.add_caregivers(vec![first, second]);
    let shift = engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();

    let (schedule_id, event) = engine.claim_shift(&shift, &first_id, now()).unwrap();
    assert_eq!(event.caregiver, first_id);
    assert!(engine
        .directory()
        .schedules
        .iter()
        .any(|s| s.id == schedule_id));

    let err = engine.claim_shift(&shift, &second_id, now()).unwrap_err();
    assert!(matches!(err, EngineError::ShiftNotOpen(_)));
}

#[test]
fn claim_enforces_the_hard_gates() {
    let (mut engine, client) = engine_with_client(&["CNA"]);
    let unqualified = caregiver("unqualified", 40.0);
    let id = unqualified.id.clone();
    engine.add_caregivers(vec![unqualified]);
    let shift = engine
        .post_shift(&client, date(2025, 11, 4), time(9, 0), time(12, 0), 0)
        .unwrap();

    let err = engine.claim_shift(&shift, &id, now()).unwrap_err();
    assert!(matches!(err, EngineError::ClaimRejected(_)));
    assert!(engine.directory().schedules.is_empty());
}
