use super::SchedError;
use crate::model::{Assignment, DutyType, ExclusionSet, GapReason, Provider};
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub(super) fn ensure_unique_duties(duties: &[DutyType]) -> Result<(), SchedError> {
    let mut seen = BTreeSet::new();
    for duty in duties {
        if !seen.insert(duty.name.as_str()) {
            return Err(SchedError::DuplicateDutyType(duty.name.clone()));
        }
    }
    Ok(())
}

/// Pourquoi aucun candidat n'a été trouvé pour ce créneau.
pub(super) fn gap_reason(
    roster: &[Provider],
    exclusions: &ExclusionSet,
    date: NaiveDate,
) -> GapReason {
    if roster.is_empty() {
        GapReason::EmptyRoster
    } else if roster.iter().all(|p| exclusions.is_excluded(p, date)) {
        GapReason::Unavailable
    } else {
        GapReason::AlreadyBooked
    }
}

pub(super) fn find_assignment_index(
    assignments: &[Assignment],
    date: NaiveDate,
    duty: &str,
) -> Option<usize> {
    assignments
        .iter()
        .position(|a| a.date == date && a.duty == duty)
}
