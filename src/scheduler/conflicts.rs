use super::{Violation, ViolationKind};
use crate::model::{Assignment, ExclusionSet, Schedule};
use chrono::Datelike;
use std::collections::BTreeSet;

pub(super) fn check_schedule(schedule: &Schedule, extra: &ExclusionSet) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut slots = BTreeSet::new();
    let mut booked = BTreeSet::new();

    for a in &schedule.assignments {
        let mut flag = |kind| out.push(violation(a, kind));

        match schedule.find_duty(&a.duty) {
            None => flag(ViolationKind::UnknownDuty),
            Some(duty) if !duty.days.contains(a.date.weekday()) => flag(ViolationKind::OffDay),
            Some(_) => {}
        }
        if !schedule.range.contains(a.date) {
            flag(ViolationKind::OutOfRange);
        }
        if schedule.is_excluded(extra, &a.provider, a.date) {
            flag(ViolationKind::Excluded);
        }
        if !slots.insert((a.date, a.duty.as_str())) {
            flag(ViolationKind::DuplicateSlot);
        }
        if !booked.insert((a.date, &a.provider)) {
            flag(ViolationKind::DoubleBooking);
        }
    }

    out
}

fn violation(a: &Assignment, kind: ViolationKind) -> Violation {
    Violation {
        date: a.date,
        duty: a.duty.clone(),
        provider: a.provider.clone(),
        kind,
    }
}
