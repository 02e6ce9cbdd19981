#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use domiplan::model::{Caregiver, Client, Directory, OpenShift, WeeklyAvailability};
use domiplan::storage::{JsonStorage, Storage};
use tempfile::tempdir;

#[test]
fn save_and_load_directory_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("directory.json");

    let mut directory = Directory::default();
    let client = Client::new("Ada");
    directory.open_shifts.push(
        OpenShift::new(
            client.id.clone(),
            NaiveDate::from_ymd_opt(2025, 11, 4).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            3,
        )
        .unwrap(),
    );
    directory.clients.push(client);
    directory
        .caregivers
        .push(Caregiver::new("Marie", WeeklyAvailability::full_time(40.0)));

    let storage = JsonStorage::open(&path).unwrap();
    storage.save(&directory).unwrap();

    let loaded = storage.load().unwrap();
    assert_eq!(loaded, directory);
}

#[test]
fn load_missing_file_errors() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("absent.json")).unwrap();
    assert!(storage.load().is_err());
}
