#![forbid(unsafe_code)]
use chrono::NaiveDate;
use garde::{
    default_duties, generate, scheduler::check_schedule, DateRange, DutyType, ExclusionSet,
    GapReason, Provider, SchedError, Scheduler, WeekdaySet,
};

fn day(d: u32) -> NaiveDate {
    // janvier 2025 : le 6 est un lundi
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn roster(names: &[&str]) -> Vec<Provider> {
    names.iter().map(Provider::new).collect()
}

fn clinic(days: &str) -> DutyType {
    DutyType::new("Clinic", days.parse().unwrap())
}

fn providers_of(schedule: &garde::Schedule) -> Vec<&str> {
    schedule
        .assignments
        .iter()
        .map(|a| a.provider.as_str())
        .collect()
}

#[test]
fn two_providers_alternate_over_a_week() {
    let range = DateRange::new(day(6), day(10)).unwrap();
    let schedule = generate(
        &roster(&["A", "B"]),
        &[clinic("Mon,Tue,Wed,Thu,Fri")],
        range,
        &ExclusionSet::new(),
    )
    .unwrap();

    assert!(schedule.gaps.is_empty());
    assert_eq!(providers_of(&schedule), ["A", "B", "A", "B", "A"]);
    let counts = schedule.counts_for("Clinic");
    assert_eq!(counts[&Provider::new("A")], 3);
    assert_eq!(counts[&Provider::new("B")], 2);
}

#[test]
fn excluded_provider_is_skipped() {
    let mut exclusions = ExclusionSet::new();
    exclusions.insert(Provider::new("A"), day(6));

    let schedule = generate(
        &roster(&["A", "B"]),
        &[clinic("Mon")],
        DateRange::single(day(6)),
        &exclusions,
    )
    .unwrap();

    assert_eq!(providers_of(&schedule), ["B"]);
    assert!(schedule.gaps.is_empty());
}

#[test]
fn lone_excluded_provider_leaves_a_gap() {
    let mut exclusions = ExclusionSet::new();
    exclusions.insert(Provider::new("A"), day(6));

    let schedule = generate(
        &roster(&["A"]),
        &[clinic("Mon")],
        DateRange::single(day(6)),
        &exclusions,
    )
    .unwrap();

    assert!(schedule.assignments.is_empty());
    assert_eq!(schedule.gaps.len(), 1);
    assert_eq!(schedule.gaps[0].date, day(6));
    assert_eq!(schedule.gaps[0].duty, "Clinic");
    assert_eq!(schedule.gaps[0].reason, GapReason::Unavailable);
}

#[test]
fn empty_roster_turns_every_slot_into_a_gap() {
    let range = DateRange::weeks(day(6), 1).unwrap();
    let schedule = generate(&[], &default_duties(), range, &ExclusionSet::new()).unwrap();

    assert!(schedule.assignments.is_empty());
    // 5 jours de consultation + 7 jours d'hospitalisation
    assert_eq!(schedule.gaps.len(), 12);
    assert!(schedule
        .gaps
        .iter()
        .all(|g| g.reason == GapReason::EmptyRoster));
}

#[test]
fn reversed_range_is_rejected_before_assignment() {
    let range = DateRange {
        start: day(10),
        end: day(6),
    };
    let err = generate(&roster(&["A"]), &default_duties(), range, &ExclusionSet::new())
        .unwrap_err();
    assert!(matches!(err, SchedError::InvalidRange { .. }));
    assert!(DateRange::new(day(10), day(6)).is_err());
}

#[test]
fn duty_without_weekday_produces_no_slot() {
    let duties = vec![DutyType::new("Night", WeekdaySet::EMPTY), clinic("Mon")];
    let schedule = generate(
        &roster(&["A"]),
        &duties,
        DateRange::weeks(day(6), 1).unwrap(),
        &ExclusionSet::new(),
    )
    .unwrap();

    assert_eq!(schedule.assignments.len(), 1);
    assert!(schedule.assignments.iter().all(|a| a.duty == "Clinic"));
    let skipped: Vec<_> = schedule.skipped_duties().map(|d| d.name.as_str()).collect();
    assert_eq!(skipped, ["Night"]);
    assert!(matches!(
        duties[0].validate(),
        Err(SchedError::EmptyDutyType(name)) if name == "Night"
    ));
}

#[test]
fn duplicate_duty_names_are_rejected() {
    let err = generate(
        &roster(&["A"]),
        &[clinic("Mon"), clinic("Tue")],
        DateRange::single(day(6)),
        &ExclusionSet::new(),
    )
    .unwrap_err();
    assert!(matches!(err, SchedError::DuplicateDutyType(name) if name == "Clinic"));
}

#[test]
fn single_day_yields_at_most_one_assignment_per_duty() {
    let duties = default_duties();
    let monday = DateRange::single(day(6));

    let full = generate(&roster(&["A", "B", "C"]), &duties, monday, &ExclusionSet::new()).unwrap();
    assert_eq!(full.assignments.len(), duties.len());

    let short = generate(&roster(&["A"]), &duties, monday, &ExclusionSet::new()).unwrap();
    assert_eq!(short.assignments.len(), 1);
    assert_eq!(short.gaps.len(), 1);
    assert_eq!(short.gaps[0].duty, "Inpatient");
    assert_eq!(short.gaps[0].reason, GapReason::AlreadyBooked);
}

#[test]
fn rotation_follows_count_then_recency_then_name() {
    let schedule = generate(
        &roster(&["C", "B", "A"]),
        &default_duties(),
        DateRange::weeks(day(6), 1).unwrap(),
        &ExclusionSet::new(),
    )
    .unwrap();

    let clinic: Vec<_> = schedule
        .assignments
        .iter()
        .filter(|a| a.duty == "Clinic")
        .map(|a| a.provider.as_str())
        .collect();
    let inpatient: Vec<_> = schedule
        .assignments
        .iter()
        .filter(|a| a.duty == "Inpatient")
        .map(|a| a.provider.as_str())
        .collect();

    assert_eq!(clinic, ["A", "B", "C", "A", "B"]);
    assert_eq!(inpatient, ["B", "A", "B", "C", "A", "C", "B"]);
    assert!(schedule.gaps.is_empty());
}

#[test]
fn load_stays_balanced_over_eight_weeks() {
    let duties = vec![
        DutyType::new("Clinic", WeekdaySet::working_days()),
        DutyType::new("Inpatient", "Sat,Sun".parse().unwrap()),
    ];
    let schedule = generate(
        &roster(&["A", "B", "C", "D"]),
        &duties,
        DateRange::weeks(day(6), 8).unwrap(),
        &ExclusionSet::new(),
    )
    .unwrap();

    assert_eq!(schedule.assignments.len(), 56);
    assert!(schedule.spread("Clinic").unwrap() <= 1);
    assert!(schedule.spread("Inpatient").unwrap() <= 1);
}

#[test]
fn exclusions_and_single_booking_hold_with_shared_days() {
    let mut exclusions = ExclusionSet::new();
    exclusions
        .insert_range(Provider::new("A"), day(8), day(14))
        .unwrap();
    exclusions.insert(Provider::new("C"), day(20));
    exclusions.insert(Provider::new("B"), day(20));

    let schedule = generate(
        &roster(&["A", "B", "C"]),
        &default_duties(),
        DateRange::weeks(day(6), 4).unwrap(),
        &exclusions,
    )
    .unwrap();

    assert!(check_schedule(&schedule, &exclusions).is_empty());
    for a in &schedule.assignments {
        assert!(!exclusions.is_excluded(&a.provider, a.date));
    }
    // le 20, seul A est disponible : une des deux gardes reste vide
    let gap = schedule.gaps.iter().find(|g| g.date == day(20)).unwrap();
    assert_eq!(gap.reason, GapReason::AlreadyBooked);
}

#[test]
fn generation_is_deterministic() {
    let mut exclusions = ExclusionSet::new();
    exclusions
        .insert_range(Provider::new("B"), day(9), day(12))
        .unwrap();
    let providers = roster(&["D", "B", "A", "C"]);
    let range = DateRange::weeks(day(6), 3).unwrap();

    let first = generate(&providers, &default_duties(), range, &exclusions).unwrap();
    let second = generate(&providers, &default_duties(), range, &exclusions).unwrap();
    assert_eq!(first, second);
}

#[test]
fn roster_is_sorted_and_deduplicated() {
    let schedule = generate(
        &roster(&["B", "A", "B"]),
        &[clinic("Mon")],
        DateRange::single(day(6)),
        &ExclusionSet::new(),
    )
    .unwrap();
    assert_eq!(schedule.providers, roster(&["A", "B"]));
}

#[test]
fn scheduler_carries_its_configuration() {
    let mut scheduler = Scheduler::new().with_duties(vec![clinic("Mon,Tue")]);
    scheduler.add_providers(roster(&["A", "B"]));
    scheduler.exclusions_mut().insert(Provider::new("A"), day(6));

    let schedule = scheduler.generate(DateRange::weeks(day(6), 1).unwrap()).unwrap();
    assert_eq!(providers_of(&schedule), ["B", "A"]);
    assert!(scheduler.check(&schedule).is_empty());
}

#[test]
fn weekday_sets_parse_short_and_long_names() {
    let set: WeekdaySet = "monday, Wed ,fri".parse().unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.to_string(), "Mon,Wed,Fri");
    assert!("".parse::<WeekdaySet>().unwrap().is_empty());
    assert!(matches!(
        "Mon,Funday".parse::<WeekdaySet>(),
        Err(SchedError::InvalidWeekday(d)) if d == "Funday"
    ));
}

#[test]
fn horizon_past_the_calendar_end_is_an_invalid_range() {
    assert!(matches!(
        DateRange::weeks(NaiveDate::MAX, 1),
        Err(SchedError::InvalidRange { .. })
    ));
    let last_week = NaiveDate::MAX - chrono::Days::new(6);
    assert_eq!(DateRange::weeks(last_week, 1).unwrap().end, NaiveDate::MAX);
}
