use super::{util, SchedError};
use crate::model::{Assignment, ExclusionSet, Gap, GapReason, Provider, Schedule};
use chrono::{Datelike, NaiveDate};

pub(super) fn reassign(
    schedule: &Schedule,
    date: NaiveDate,
    duty: &str,
    provider: Option<&Provider>,
    extra: &ExclusionSet,
) -> Result<Schedule, SchedError> {
    let order = slot_order(schedule, date, duty)?;
    let current = util::find_assignment_index(&schedule.assignments, date, duty);

    let Some(provider) = provider else {
        let mut next = schedule.clone();
        if let Some(pos) = current {
            next.assignments.remove(pos);
            let at = next
                .gaps
                .partition_point(|g| gap_order(schedule, g) < order);
            next.gaps.insert(
                at,
                Gap {
                    date,
                    duty: duty.to_string(),
                    reason: GapReason::Released,
                },
            );
        }
        return Ok(next);
    };

    if !schedule.providers.contains(provider) {
        return Err(SchedError::UnknownProvider(provider.as_str().to_string()));
    }
    if current.is_some_and(|pos| &schedule.assignments[pos].provider == provider) {
        return Ok(schedule.clone());
    }
    if schedule.is_excluded(extra, provider, date) {
        return Err(SchedError::ReassignInvalid("provider unavailable on that date"));
    }
    if schedule.booked_duty(provider, date).is_some() {
        return Err(SchedError::ReassignInvalid("provider already booked on that date"));
    }

    let mut next = schedule.clone();
    match current {
        Some(pos) => next.assignments[pos].provider = provider.clone(),
        None => {
            next.gaps.retain(|g| !(g.date == date && g.duty == duty));
            let at = next
                .assignments
                .partition_point(|a| assignment_order(schedule, a) < order);
            next.assignments.insert(
                at,
                Assignment {
                    date,
                    duty: duty.to_string(),
                    provider: provider.clone(),
                },
            );
        }
    }
    Ok(next)
}

pub(super) fn swap(
    schedule: &Schedule,
    a: (NaiveDate, &str),
    b: (NaiveDate, &str),
    extra: &ExclusionSet,
) -> Result<Schedule, SchedError> {
    if a == b {
        return Err(SchedError::SwapInvalid("both slots are the same"));
    }
    let Some(pos_a) = util::find_assignment_index(&schedule.assignments, a.0, a.1) else {
        return Err(SchedError::SwapInvalid("first slot is not assigned"));
    };
    let Some(pos_b) = util::find_assignment_index(&schedule.assignments, b.0, b.1) else {
        return Err(SchedError::SwapInvalid("second slot is not assigned"));
    };

    let first = &schedule.assignments[pos_a];
    let second = &schedule.assignments[pos_b];
    if first.provider == second.provider {
        return Ok(schedule.clone());
    }

    if schedule.is_excluded(extra, &second.provider, first.date)
        || schedule.is_excluded(extra, &first.provider, second.date)
    {
        return Err(SchedError::SwapInvalid("provider unavailable on target date"));
    }
    if busy_elsewhere(schedule, &second.provider, first.date, b)
        || busy_elsewhere(schedule, &first.provider, second.date, a)
    {
        return Err(SchedError::SwapInvalid("introduces double booking"));
    }

    let mut next = schedule.clone();
    next.assignments[pos_a].provider = second.provider.clone();
    next.assignments[pos_b].provider = first.provider.clone();
    Ok(next)
}

/// `provider` tient-il ce jour-là une autre garde que `leaving` (qu'il va quitter) ?
fn busy_elsewhere(
    schedule: &Schedule,
    provider: &Provider,
    date: NaiveDate,
    leaving: (NaiveDate, &str),
) -> bool {
    schedule
        .booked_duty(provider, date)
        .is_some_and(|duty| (date, duty) != leaving)
}

/// Position (jour, rang de la garde) d'un créneau existant.
fn slot_order(
    schedule: &Schedule,
    date: NaiveDate,
    duty: &str,
) -> Result<(NaiveDate, usize), SchedError> {
    let Some(rank) = schedule.duties.iter().position(|d| d.name == duty) else {
        return Err(SchedError::UnknownDuty(duty.to_string()));
    };
    let active = schedule.duties[rank].days.contains(date.weekday());
    if !schedule.range.contains(date) || !active {
        return Err(SchedError::UnknownSlot {
            date,
            duty: duty.to_string(),
        });
    }
    Ok((date, rank))
}

fn duty_rank(schedule: &Schedule, duty: &str) -> usize {
    schedule
        .duties
        .iter()
        .position(|d| d.name == duty)
        .unwrap_or(usize::MAX)
}

fn assignment_order(schedule: &Schedule, a: &Assignment) -> (NaiveDate, usize) {
    (a.date, duty_rank(schedule, &a.duty))
}

fn gap_order(schedule: &Schedule, g: &Gap) -> (NaiveDate, usize) {
    (g.date, duty_rank(schedule, &g.duty))
}
