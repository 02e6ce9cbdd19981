#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use domiplan::engine::{occurs_on, week_start, windows_overlap};
use domiplan::model::{CaregiverId, ClientId, Frequency, Schedule};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn recurring(weekday: u8, frequency: Frequency) -> Schedule {
    Schedule::recurring(
        CaregiverId::random(),
        ClientId::random(),
        weekday,
        time(9, 0),
        time(12, 0),
        frequency,
    )
    .unwrap()
}

#[test]
fn overlap_is_symmetric() {
    let cases = [
        (time(9, 0), time(12, 0), time(10, 0), time(14, 0)),
        (time(9, 0), time(12, 0), time(9, 0), time(12, 0)),
        (time(9, 0), time(12, 0), time(12, 0), time(14, 0)),
        (time(8, 0), time(9, 0), time(18, 0), time(20, 0)),
    ];
    for (a_start, a_end, b_start, b_end) in cases {
        assert_eq!(
            windows_overlap(a_start, a_end, b_start, b_end),
            windows_overlap(b_start, b_end, a_start, a_end)
        );
    }
}

#[test]
fn identical_bounds_conflict_adjacent_do_not() {
    assert!(windows_overlap(time(9, 0), time(12, 0), time(9, 0), time(12, 0)));
    assert!(!windows_overlap(time(9, 0), time(12, 0), time(12, 0), time(14, 0)));
}

#[test]
fn one_time_occurs_only_on_its_date() {
    let s = Schedule::one_time(
        CaregiverId::random(),
        ClientId::random(),
        date(2025, 11, 4),
        time(9, 0),
        time(12, 0),
    )
    .unwrap();
    assert!(occurs_on(&s, date(2025, 11, 4)));
    assert!(!occurs_on(&s, date(2025, 11, 5)));
    assert!(!occurs_on(&s, date(2025, 11, 11)));
}

#[test]
fn weekly_recurring_matches_weekday() {
    // mardi = 2 (0 = dimanche)
    let s = recurring(2, Frequency::Weekly);
    assert!(occurs_on(&s, date(2025, 11, 4)));
    assert!(occurs_on(&s, date(2025, 11, 11)));
    assert!(!occurs_on(&s, date(2025, 11, 5)));
}

#[test]
fn biweekly_parity_follows_anchor() {
    let mut s = recurring(2, Frequency::Biweekly);
    s.anchor_date = Some(date(2025, 11, 4));

    assert!(occurs_on(&s, date(2025, 11, 4)));
    assert!(!occurs_on(&s, date(2025, 11, 11)));
    assert!(occurs_on(&s, date(2025, 11, 18)));
    assert!(!occurs_on(&s, date(2025, 11, 25)));
    assert!(occurs_on(&s, date(2025, 12, 2)));
}

#[test]
fn effective_date_suppresses_earlier_occurrences() {
    let mut s = recurring(2, Frequency::Biweekly);
    s.anchor_date = Some(date(2025, 11, 4));
    s.effective_date = Some(date(2025, 11, 18));

    assert!(!occurs_on(&s, date(2025, 11, 4)));
    assert!(occurs_on(&s, date(2025, 11, 18)));

    let mut weekly = recurring(2, Frequency::Weekly);
    weekly.effective_date = Some(date(2025, 11, 11));
    assert!(!occurs_on(&weekly, date(2025, 11, 4)));
    assert!(occurs_on(&weekly, date(2025, 11, 11)));
}

#[test]
fn biweekly_without_anchor_falls_back_to_effective_date() {
    let mut s = recurring(2, Frequency::Biweekly);
    s.effective_date = Some(date(2025, 11, 4));
    assert!(occurs_on(&s, date(2025, 11, 4)));
    assert!(!occurs_on(&s, date(2025, 11, 11)));
}

#[test]
fn week_start_snaps_to_sunday() {
    assert_eq!(week_start(date(2025, 11, 2)), date(2025, 11, 2));
    assert_eq!(week_start(date(2025, 11, 4)), date(2025, 11, 2));
    assert_eq!(week_start(date(2025, 11, 8)), date(2025, 11, 2));
}

#[test]
fn consistency_scan_flags_overlap_between_recurring_and_one_time() {
    use domiplan::model::{Caregiver, Client, WeeklyAvailability};
    use domiplan::Engine;

    let mut engine = Engine::new();
    let client = Client::new("Ada");
    let caregiver = Caregiver::new("Marie", WeeklyAvailability::full_time(40.0));

    let mut weekly = recurring(2, Frequency::Weekly);
    weekly.caregiver = caregiver.id.clone();
    weekly.client = client.id.clone();
    engine.directory_mut().schedules.push(weekly);
    engine.directory_mut().schedules.push(
        Schedule::one_time(
            caregiver.id.clone(),
            client.id.clone(),
            date(2025, 11, 4),
            time(11, 0),
            time(13, 0),
        )
        .unwrap(),
    );
    engine.add_clients(vec![client]);
    engine.add_caregivers(vec![caregiver]);

    let conflicts = engine.detect_conflicts(date(2025, 11, 4));
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].date, date(2025, 11, 4));

    // la semaine suivante, le ponctuel n'existe plus : rien à signaler
    assert!(engine.detect_conflicts(date(2025, 11, 11)).is_empty());
}
