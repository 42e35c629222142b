#![forbid(unsafe_code)]
#![cfg(feature = "serde")]
use chrono::NaiveDate;
use garde::{
    generate_from_profile, DutyType, ExclusionSet, Profile, ProfileStore, Provider, WeekdaySet,
};
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn sample_profile(id: &str) -> Profile {
    Profile {
        id: id.into(),
        name: "Service de médecine".into(),
        description: Some("Consultation en semaine".into()),
        providers: vec!["B".into(), " A ".into(), "".into(), "B".into()],
        duties: vec![DutyType::new("Clinic", WeekdaySet::working_days())],
        horizon_weeks: 1,
        vacation_files: Vec::new(),
        admin_files: Vec::new(),
        metadata: None,
    }
}

#[test]
fn save_load_and_list_profiles() {
    let dir = tempdir().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));
    assert!(store.list().unwrap().profiles.is_empty());

    store.save(&sample_profile("zeta")).unwrap();
    store.save(&sample_profile("alpha")).unwrap();
    std::fs::write(dir.path().join("profiles/broken.json"), "{not json").unwrap();

    let loaded = store.load("alpha").unwrap();
    assert_eq!(loaded.duties, sample_profile("alpha").duties);
    assert_eq!(loaded.roster(), [Provider::new("B"), Provider::new("A")]);

    let listing = store.list().unwrap();
    let ids: Vec<_> = listing
        .profiles
        .iter()
        .map(|info| info.profile.id.as_str())
        .collect();
    assert_eq!(ids, ["alpha", "zeta"]);
    assert_eq!(listing.unreadable, [dir.path().join("profiles/broken.json")]);
}

#[test]
fn profile_ids_cannot_leave_the_profiles_directory() {
    let dir = tempdir().unwrap();
    let outside = dir.path().join("x.json");
    std::fs::write(
        &outside,
        serde_json::to_string(&sample_profile("x")).unwrap(),
    )
    .unwrap();

    let store = ProfileStore::new(dir.path().join("profiles"));
    for id in ["../x", "..", "a/b", "a\\b", ""] {
        assert!(store.load(id).is_err(), "{id:?} should be refused");
    }
}

#[test]
fn invalid_profiles_are_refused() {
    let dir = tempdir().unwrap();
    let store = ProfileStore::new(dir.path());

    let mut no_horizon = sample_profile("p");
    no_horizon.horizon_weeks = 0;
    assert!(store.save(&no_horizon).is_err());

    let mut twice = sample_profile("p");
    twice.duties.push(DutyType::new("Clinic", WeekdaySet::all()));
    assert!(store.save(&twice).is_err());

    assert!(store.save(&sample_profile("../escape")).is_err());

    let mut empty_days = sample_profile("p");
    empty_days.duties.push(DutyType::new("Night", WeekdaySet::EMPTY));
    assert!(store.save(&empty_days).is_ok());
}

#[test]
fn missing_duties_fall_back_to_clinic_and_inpatient() {
    let profile: Profile =
        serde_json::from_str(r#"{"id":"p","name":"P","providers":["A"],"horizon_weeks":2}"#)
            .unwrap();
    let names: Vec<_> = profile.duties.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["Clinic", "Inpatient"]);
    assert_eq!(profile.date_range(day(6)).unwrap().end, day(19));
}

#[test]
fn generate_from_profile_reads_vacation_files() {
    let dir = tempdir().unwrap();
    let vacations = dir.path().join("vacations.csv");
    std::fs::write(&vacations, "Provider,Start Date,End Date\nA,2025-01-06,2025-01-07\n").unwrap();

    let mut profile = sample_profile("p");
    profile.vacation_files.push(vacations);

    let run = generate_from_profile(&profile, day(6), ExclusionSet::new()).unwrap();
    assert!(run.skipped.is_empty());
    let schedule = run.schedule;
    assert!(schedule.exclusions.is_excluded(&Provider::new("A"), day(7)));
    let clinic: Vec<_> = schedule
        .assignments
        .iter()
        .map(|a| (a.date, a.provider.as_str()))
        .collect();
    assert_eq!(
        clinic,
        [
            (day(6), "B"),
            (day(7), "B"),
            (day(8), "A"),
            (day(9), "A"),
            (day(10), "B"),
        ]
    );

    let mut extra = ExclusionSet::new();
    extra.insert(Provider::new("B"), day(10));
    let schedule = generate_from_profile(&profile, day(6), extra).unwrap().schedule;
    assert_eq!(schedule.assignment_for(day(10), "Clinic").unwrap().provider.as_str(), "A");
}

#[test]
fn skipped_rows_in_profile_files_are_reported() {
    let dir = tempdir().unwrap();
    let admin = dir.path().join("admin.csv");
    std::fs::write(
        &admin,
        "Provider,Start Date,End Date\nB,2025-01-08,2025-01-08\nB,someday,2025-01-09\n,2025-01-09,2025-01-09\n",
    )
    .unwrap();

    let mut profile = sample_profile("p");
    profile.admin_files.push(admin.clone());

    let run = generate_from_profile(&profile, day(6), ExclusionSet::new()).unwrap();
    assert_eq!(run.skipped, [(admin, 2)]);
    assert_eq!(run.schedule.assignment_for(day(8), "Clinic").unwrap().provider.as_str(), "A");
}
